//! Property-based tests for log_service using proptest

use log_service::core::{Drained, LogFilter, MessagePool, MessageQueue};
use log_service::destinations::mapped_file::required_pages;
use log_service::destinations::{LineFormat, MappedFile, RollingType, PAGE_SIZE};
use log_service::prelude::*;
use log_service::{LogMessage, LogTime};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

fn any_time() -> impl Strategy<Value = LogTime> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60, 0u32..1000).prop_map(
        |(y, mo, d, h, mi, s, ms)| {
            LogTime::from_ymd_hms_milli(y, mo, d, h, mi, s, ms).expect("valid calendar fields")
        },
    )
}

// ============================================================================
// LogLevel and LogFilter Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level(), use_lower in any::<bool>()) {
        let name = if use_lower { level.to_str().to_lowercase() } else { level.to_string() };
        let parsed: LogLevel = name.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Test that the raw value maps back to the same level
    #[test]
    fn test_log_level_raw_roundtrip(level in any_level()) {
        prop_assert_eq!(LogLevel::try_from(level as u8).unwrap(), level);
        prop_assert_eq!(level.bit(), 1 << (level as u32 - 1));
    }

    /// Test that out-of-range raw values are rejected, not mapped
    #[test]
    fn test_log_level_invalid_raw(raw in prop_oneof![Just(0u8), 7u8..=255]) {
        prop_assert!(LogLevel::try_from(raw).is_err());
    }

    /// Test that LogLevel JSON serialization roundtrips
    #[test]
    fn test_log_level_json_roundtrip(level in any_level()) {
        let json = serde_json::to_string(&level).unwrap();
        let back: LogLevel = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, level);
    }

    /// Test that any sequence of toggles leaves exactly the expected levels off
    #[test]
    fn test_filter_matches_model(toggles in prop::collection::vec((any_level(), any::<bool>()), 0..40)) {
        let filter = LogFilter::new();
        let mut off = HashSet::new();
        for (level, on) in toggles {
            filter.filter(level, on);
            if on {
                off.remove(&level);
            } else {
                off.insert(level);
            }
        }
        for level in LogLevel::ALL {
            prop_assert_eq!(filter.is_filter(level), off.contains(&level), "level {}", level);
        }
    }
}

// ============================================================================
// Pool Tests
// ============================================================================

proptest! {
    /// Test that a reused record carries only the fields of its latest use
    #[test]
    fn test_pool_reuse_has_no_stale_fields(
        first in "[a-zA-Z0-9 ]{0,64}",
        second in "[a-zA-Z0-9 ]{0,8}",
        tag in "[a-z]{0,8}",
        level in any_level(),
        line in 0u32..100_000,
    ) {
        let pool = MessagePool::new(1);
        let mut msg = pool.allocate();
        msg.option(LogLevel::Fatal, &first, "old-tag", "old-feature", "old.rs", 9);
        let mut batch = vec![msg];
        pool.recycle(&mut batch);

        let mut reused = pool.allocate();
        prop_assert!(!reused.is_overflow());
        reused.option(level, &second, &tag, "", "new.rs", line);
        prop_assert_eq!(reused.msg(), second.as_str());
        prop_assert_eq!(reused.tag(), tag.as_str());
        prop_assert_eq!(reused.feature(), "");
        prop_assert_eq!(reused.source(), "new.rs");
        prop_assert_eq!(reused.line(), line);
        prop_assert_eq!(reused.level(), level);
    }

    /// Test that any allocate/recycle pattern keeps the pool within two batches
    #[test]
    fn test_pool_stays_bounded(
        batch_size in 1usize..64,
        rounds in prop::collection::vec(0usize..200, 1..20),
    ) {
        let pool = MessagePool::new(batch_size);
        for take in rounds {
            let mut batch: Vec<LogMessage> = (0..take).map(|_| pool.allocate()).collect();
            pool.recycle(&mut batch);
            prop_assert!(batch.is_empty());
            prop_assert!(
                pool.pooled() <= 2 * batch_size,
                "pooled {} with batch {}",
                pool.pooled(),
                batch_size
            );
        }
    }
}

// ============================================================================
// Queue Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Test that concurrent producers see their records drained in put order
    #[test]
    fn test_queue_keeps_per_producer_order(producers in 1usize..6, per_producer in 1usize..500) {
        let queue = Arc::new(MessageQueue::new());
        let handles: Vec<_> = (0..producers)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..per_producer {
                        let mut msg = LogMessage::new();
                        msg.option(LogLevel::Info, &i.to_string(), &p.to_string(), "", "", 0);
                        queue.put(msg);
                    }
                })
            })
            .collect();

        let mut next = vec![0usize; producers];
        let mut buf = Vec::new();
        let mut seen = 0;
        while seen < producers * per_producer {
            if queue.drain(true, &mut buf) == Drained::Ready {
                for msg in buf.drain(..) {
                    let p: usize = msg.tag().parse().unwrap();
                    let i: usize = msg.msg().parse().unwrap();
                    prop_assert_eq!(i, next[p], "producer {}", p);
                    next[p] += 1;
                    seen += 1;
                }
            } else {
                thread::yield_now();
            }
        }
        for handle in handles {
            handle.join().unwrap();
        }
        prop_assert_eq!(queue.drain(false, &mut buf), Drained::Empty);
    }
}

// ============================================================================
// Rolling Policy Tests
// ============================================================================

proptest! {
    /// Test that daily rotation fires exactly when the calendar date differs
    #[test]
    fn test_daily_rolls_on_date_change(opened in any_time(), record in any_time()) {
        let date_differs = opened.naive().date() != record.naive().date();
        prop_assert_eq!(RollingType::Daily.should_roll(&opened, &record), date_differs);
    }

    /// Test that hourly rotation fires on any date or hour change
    #[test]
    fn test_hourly_rolls_on_hour_change(opened in any_time(), record in any_time()) {
        let expected = opened.naive().date() != record.naive().date() || opened.hour() != record.hour();
        prop_assert_eq!(RollingType::Hourly.should_roll(&opened, &record), expected);
    }

    /// Test that a daily roll always implies an hourly roll
    #[test]
    fn test_daily_implies_hourly(opened in any_time(), record in any_time()) {
        if RollingType::Daily.should_roll(&opened, &record) {
            prop_assert!(RollingType::Hourly.should_roll(&opened, &record));
        }
    }

    /// Test that a record in the file's own hour never rolls
    #[test]
    fn test_same_hour_never_rolls(opened in any_time(), minute in 0u32..60, second in 0u32..60) {
        let record = LogTime::from_ymd_hms_milli(
            opened.year(), opened.month(), opened.day(), opened.hour(), minute, second, 0,
        ).unwrap();
        prop_assert!(!RollingType::Hourly.should_roll(&opened, &record));
        prop_assert!(!RollingType::Daily.should_roll(&opened, &record));
    }
}

// ============================================================================
// Mapped File Tests
// ============================================================================

proptest! {
    /// Test that the computed growth is the smallest page count that fits
    #[test]
    fn test_required_pages_is_minimal(
        used in 0u64..1_000_000,
        msize in 0u64..100_000,
        pages in 0u64..300,
    ) {
        let capacity = pages * PAGE_SIZE;
        let grow = required_pages(used, msize, capacity);
        prop_assert!(capacity + grow * PAGE_SIZE >= used + msize);
        if grow > 0 {
            prop_assert!(capacity + (grow - 1) * PAGE_SIZE < used + msize);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Test that appends grow page-aligned and read back byte for byte
    #[test]
    fn test_mapped_file_append_round_trip(sizes in prop::collection::vec(1usize..10_000, 1..12)) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("prop.log");
        let mut expected = Vec::new();
        {
            let mut file = MappedFile::create_new(&path).unwrap();
            for (i, size) in sizes.iter().enumerate() {
                let chunk = vec![b'a' + (i % 26) as u8; *size];
                file.append(&chunk).unwrap();
                expected.extend_from_slice(&chunk);
                prop_assert_eq!(file.capacity() % PAGE_SIZE, 0);
                prop_assert!(file.capacity() >= file.used());
                prop_assert_eq!(file.used(), expected.len() as u64);
            }
        }
        prop_assert_eq!(std::fs::read(&path).unwrap(), expected);
    }
}

// ============================================================================
// Line Format Tests
// ============================================================================

proptest! {
    /// Test the rendered layout and both suppression toggles
    #[test]
    fn test_line_layout(
        time in any_time(),
        level in any_level(),
        msg in "[a-zA-Z0-9 .,:=]{0,80}",
        tag in "[a-z]{0,6}",
        source in "[a-z]{1,8}\\.rs",
        line in 0u32..10_000,
        ignore_prefix in any::<bool>(),
        ignore_suffix in any::<bool>(),
    ) {
        let mut record = LogMessage::new();
        record.option_at(time, level, &msg, &tag, "", &source, line);

        let mut format = LineFormat::new();
        format.ignore_prefix(ignore_prefix);
        format.ignore_suffix(ignore_suffix);

        let prefix = if ignore_prefix {
            String::new()
        } else {
            format!("[{}][{}][{}] ", time, tag, level)
        };
        let suffix = if ignore_suffix {
            String::new()
        } else {
            format!("[{}:{}]", source, line)
        };
        let expected = format!("{}{}{}", prefix, msg, suffix);
        let expected_line = format!("{}\n", expected);
        prop_assert_eq!(format.format(&record), expected.as_str());
        prop_assert_eq!(format.format_line(&record), expected_line.as_bytes());
    }
}
