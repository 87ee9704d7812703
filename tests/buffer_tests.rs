use chrono::{TimeZone, Utc};

use sentiment_dash::model::buffer::{RecordBuffer, DEFAULT_BUFFER_LEN};
use sentiment_dash::model::record::StreamRecord;

fn rec(seq: i64) -> StreamRecord {
    let mut r = StreamRecord::at(Utc.timestamp_opt(1_714_573_800 + seq, 0).unwrap());
    r.price = Some(seq as f64);
    r
}

fn prices(buf: &RecordBuffer) -> Vec<f64> {
    buf.iter().filter_map(|r| r.price).collect()
}

#[test]
fn default_capacity_matches_rolling_window() {
    let buf = RecordBuffer::default();
    assert_eq!(buf.capacity(), DEFAULT_BUFFER_LEN);
    assert_eq!(DEFAULT_BUFFER_LEN, 301);
    assert!(buf.is_empty());
}

#[test]
fn push_below_capacity_keeps_everything_in_order() {
    let mut buf = RecordBuffer::new(5);
    for i in 0..3 {
        buf.push(rec(i));
    }
    assert_eq!(buf.len(), 3);
    assert_eq!(prices(&buf), vec![0.0, 1.0, 2.0]);
    assert_eq!(buf.latest().and_then(|r| r.price), Some(2.0));
    assert_eq!(buf.evicted(), 0);
}

#[test]
/// 305 sequential records into a 300-slot buffer leave exactly 300,
/// and the 5 oldest are the ones dropped.
fn overflow_evicts_oldest_first() {
    let mut buf = RecordBuffer::new(300);
    for i in 0..305 {
        buf.push(rec(i));
        assert!(buf.len() <= 300);
    }
    assert_eq!(buf.len(), 300);
    assert_eq!(buf.evicted(), 5);
    let kept = prices(&buf);
    assert_eq!(kept.first().copied(), Some(5.0));
    assert_eq!(kept.last().copied(), Some(304.0));
    assert!(kept.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn clear_resets_contents_but_not_capacity() {
    let mut buf = RecordBuffer::new(2);
    for i in 0..4 {
        buf.push(rec(i));
    }
    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.evicted(), 0);
    assert_eq!(buf.capacity(), 2);
    buf.push(rec(9));
    assert_eq!(buf.to_vec().len(), 1);
}

#[test]
fn zero_capacity_is_clamped_to_one() {
    let mut buf = RecordBuffer::new(0);
    buf.push(rec(1));
    buf.push(rec(2));
    assert_eq!(buf.len(), 1);
    assert_eq!(prices(&buf), vec![2.0]);
}
