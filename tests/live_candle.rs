use chart_store::domain::market_data::{
    Candle, LiveCandleBuilder, OHLCV, Price, PriceSummary, TickOutcome, Timestamp, Volume,
};

fn bucket(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

#[test]
fn opens_seeded_from_last_historical_close() {
    let mut builder = LiveCandleBuilder::new();
    let outcome = builder.apply_tick(
        bucket(120_000),
        Price::from(101.0),
        Volume::from(5.0),
        Some(Price::from(100.0)),
    );

    assert_eq!(outcome, TickOutcome::Opened);
    let live = builder.live().unwrap();
    assert_eq!(live.time.value(), 120_000);
    assert_eq!(live.ohlcv.open.value(), 100.0);
    assert_eq!(live.ohlcv.high.value(), 101.0);
    assert_eq!(live.ohlcv.low.value(), 100.0);
    assert_eq!(live.ohlcv.close.value(), 101.0);
    assert_eq!(live.ohlcv.volume.value(), 5.0);
}

#[test]
fn opens_from_tick_price_without_history() {
    let mut builder = LiveCandleBuilder::new();
    builder.apply_tick(bucket(0), Price::from(50.0), Volume::from(1.0), None);

    let live = builder.live().unwrap();
    assert_eq!(live.ohlcv.open.value(), 50.0);
    assert_eq!(live.ohlcv.high.value(), 50.0);
    assert_eq!(live.ohlcv.low.value(), 50.0);
}

#[test]
fn same_bucket_tick_updates_in_place() {
    let mut builder = LiveCandleBuilder::new();
    builder.apply_tick(bucket(0), Price::from(100.0), Volume::from(2.0), None);

    let outcome =
        builder.apply_tick(bucket(0), Price::from(103.0), Volume::from(3.0), None);
    assert_eq!(outcome, TickOutcome::Updated);
    builder.apply_tick(bucket(0), Price::from(99.0), Volume::from(1.0), None);

    let live = builder.live().unwrap();
    assert_eq!(live.ohlcv.high.value(), 103.0);
    assert_eq!(live.ohlcv.low.value(), 99.0);
    assert_eq!(live.ohlcv.close.value(), 99.0);
    assert_eq!(live.ohlcv.volume.value(), 6.0);
}

#[test]
fn rollover_promotes_old_bucket_and_chains_open() {
    let mut builder = LiveCandleBuilder::new();
    builder.apply_tick(bucket(60_000), Price::from(100.0), Volume::from(2.0), None);
    builder.apply_tick(bucket(60_000), Price::from(102.0), Volume::from(1.0), None);

    let outcome =
        builder.apply_tick(bucket(120_000), Price::from(103.0), Volume::from(4.0), None);

    let TickOutcome::RolledOver(old) = outcome else {
        panic!("expected rollover, got {:?}", outcome);
    };
    // Old bucket unchanged from its last tick-updated values.
    assert_eq!(old.time.value(), 60_000);
    assert_eq!(old.ohlcv.close.value(), 102.0);
    assert_eq!(old.ohlcv.volume.value(), 3.0);
    assert_eq!(builder.previous(), Some(&old));

    let live = builder.live().unwrap();
    assert_eq!(live.time.value(), 120_000);
    assert_eq!(live.ohlcv.open.value(), 102.0);
    assert_eq!(live.ohlcv.close.value(), 103.0);
    assert_eq!(live.ohlcv.volume.value(), 4.0);
}

#[test]
fn older_bucket_tick_leaves_live_candle_untouched() {
    let mut builder = LiveCandleBuilder::new();
    builder.apply_tick(bucket(120_000), Price::from(100.0), Volume::from(2.0), None);

    let outcome =
        builder.apply_tick(bucket(60_000), Price::from(50.0), Volume::from(1.0), None);

    assert_eq!(outcome, TickOutcome::Stale);
    let live = builder.live().unwrap();
    assert_eq!(live.time.value(), 120_000);
    assert_eq!(live.ohlcv.close.value(), 100.0);
    assert_eq!(live.ohlcv.volume.value(), 2.0);
    assert!(builder.previous().is_none());
}

#[test]
fn close_clears_only_matching_bucket() {
    let mut builder = LiveCandleBuilder::new();
    builder.apply_tick(bucket(60_000), Price::from(100.0), Volume::from(1.0), None);

    assert!(!builder.close_bucket(bucket(0)));
    assert!(builder.live().is_some());

    assert!(builder.close_bucket(bucket(60_000)));
    assert!(builder.live().is_none());
    assert_eq!(builder.previous().unwrap().time.value(), 60_000);
}

#[test]
fn summary_guards_zero_open() {
    let candle = Candle::new(
        bucket(0),
        OHLCV::new(
            Price::from(0.0),
            Price::from(1.0),
            Price::from(0.0),
            Price::from(1.0),
            Volume::from(1.0),
        ),
    );
    let summary = PriceSummary::from_candle(&candle);
    assert_eq!(summary.price, 1.0);
    assert_eq!(summary.change, 1.0);
    assert_eq!(summary.change_percent, 0.0);
}

#[test]
fn summary_from_live_candle() {
    let candle = Candle::new(
        bucket(120_000),
        OHLCV::new(
            Price::from(100.0),
            Price::from(101.0),
            Price::from(100.0),
            Price::from(101.0),
            Volume::from(5.0),
        ),
    );
    let summary = PriceSummary::from_candle(&candle);
    assert_eq!(summary.price, 101.0);
    assert_eq!(summary.change, 1.0);
    assert!((summary.change_percent - 1.0).abs() < 1e-9);
}
