//! 需要真实的 Redis，未设置 `LEXPATH_TEST_REDIS_URL` 时跳过
//!
//! 测试会清空该库中全部 `usage:*` 键。

use std::sync::Arc;

use lexpath_gateway::{
    cache::RedisUsageLedger,
    usage::{Clock, LedgerError, ManualClock, UsageLedger},
};
use redis::AsyncCommands;

const WINDOW: i64 = 120_000;

fn redis_client() -> Option<redis::Client> {
    let url = std::env::var("LEXPATH_TEST_REDIS_URL").ok()?;
    Some(redis::Client::open(url).expect("invalid LEXPATH_TEST_REDIS_URL"))
}

#[tokio::test]
async fn redis_ledger_counts_limits_and_resets() {
    let Some(client) = redis_client() else {
        eprintln!("LEXPATH_TEST_REDIS_URL not set, skipping");
        return;
    };
    let client = Arc::new(client);
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let ledger = RedisUsageLedger::with_clock(client.clone(), WINDOW, clock.clone());
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();

    ledger.reset_all().await.unwrap();
    assert!(ledger.get_usage("1.2.3.4").await.unwrap().is_none());

    // 窗口内逐次累加，到上限后拒绝且不改记录
    for expected in 1..=5 {
        clock.advance(1_000);
        assert_eq!(ledger.try_consume("1.2.3.4", 5).await.unwrap(), Some(expected));
    }
    let before = ledger.get_usage("1.2.3.4").await.unwrap().unwrap();
    assert_eq!(before.request_count, 5);
    assert_eq!(before.last_request_at, clock.now_millis());

    clock.advance(1_000);
    assert_eq!(ledger.try_consume("1.2.3.4", 5).await.unwrap(), None);
    assert_eq!(ledger.get_usage("1.2.3.4").await.unwrap(), Some(before));

    let ttl: i64 = conn.pttl("usage:1.2.3.4").await.unwrap();
    assert!(ttl > 0 && ttl <= WINDOW, "ttl {ttl}");

    // 窗口过后重新从 1 开始
    clock.advance(130_000);
    assert_eq!(ledger.current_count("1.2.3.4").await.unwrap(), 0);
    assert_eq!(ledger.try_consume("1.2.3.4", 5).await.unwrap(), Some(1));
    assert_eq!(ledger.increment_usage("1.2.3.4").await.unwrap(), 2);

    // 并发请求共享同一个上限
    let ledger = Arc::new(ledger);
    let handles: Vec<_> = (0..20)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.try_consume("5.6.7.8", 5).await.unwrap() })
        })
        .collect();
    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 5);

    // 只写了一个字段的记录视为损坏
    let _: () = conn
        .hset("usage:broken", "request_count", 2)
        .await
        .unwrap();
    assert!(matches!(
        ledger.get_usage("broken").await,
        Err(LedgerError::CorruptRecord { .. })
    ));

    assert_eq!(ledger.reset_all().await.unwrap(), 3);
    assert_eq!(ledger.reset_all().await.unwrap(), 0);
}
