#![allow(clippy::cast_precision_loss, clippy::float_cmp)]
use petkit_analysis::{
    classify_coincidences, extract_decay_times, fit_half_life, partition_transaxial,
    TRANSAXIAL_EVENT_CAP,
};
use petkit_core::{Column, EventTable};

/// A table of `rows` coincidences: every 4th row scattered, every 10th
/// row random, alternating sources 0 and 1.
fn synthetic_table(rows: usize) -> EventTable {
    let mut table = EventTable::new();
    let mut put = |column: Column, f: &dyn Fn(usize) -> f64| {
        table
            .insert(column.as_str(), (0..rows).map(f).collect())
            .unwrap();
    };
    put(Column::Time1, &|i| i as f64 * 0.5);
    put(Column::RunId, &|_| 0.0);
    put(Column::GlobalPosX1, &|i| 380.0 * (i as f64).cos());
    put(Column::GlobalPosY1, &|i| 380.0 * (i as f64).sin());
    put(Column::GlobalPosX2, &|i| -380.0 * (i as f64).cos());
    put(Column::GlobalPosY2, &|i| -380.0 * (i as f64).sin());
    put(Column::GlobalPosZ1, &|i| (i % 80) as f64 - 40.0);
    put(Column::GlobalPosZ2, &|i| (i % 80) as f64 - 38.0);
    put(Column::ComptonPhantom1, &|i| if i % 4 == 0 { 1.0 } else { 0.0 });
    put(Column::ComptonPhantom2, &|_| 0.0);
    put(Column::RayleighPhantom1, &|_| 0.0);
    put(Column::RayleighPhantom2, &|_| 0.0);
    put(Column::EventId1, &|i| i as f64);
    put(Column::EventId2, &|i| if i % 10 == 0 { i as f64 + 1.0 } else { i as f64 });
    put(Column::SourceId1, &|i| (i % 2) as f64);
    put(Column::SourceId2, &|i| (i % 2) as f64);
    table
}

#[test]
fn test_classification_counts() {
    let table = synthetic_table(400);
    let counts = classify_coincidences(&table).unwrap();
    assert_eq!(counts.scatters.len(), 100);
    assert_eq!(counts.trues.len(), 300);
    assert_eq!(counts.randoms.len(), 40);
    assert_eq!(counts.total_prompts, 440);
    assert_eq!(counts.double_counted(), 40);
    assert_eq!(counts.randoms[1], 5.0);
}

#[test]
fn test_decays_split_by_source() {
    let table = synthetic_table(400);
    let decays = extract_decay_times(&table).unwrap();
    assert_eq!(decays.source0.len(), 200);
    assert_eq!(decays.source1.len(), 200);
    assert_eq!(decays.source1[0], 0.5);
}

#[test]
fn test_transaxial_partition_of_long_run() {
    let table = synthetic_table(3000);
    // time1 = i / 2, so rows below 600 are before the 300 s slice
    let partition = partition_transaxial(&table, 300.0).unwrap();
    assert_eq!(partition.before.len(), 600);
    assert_eq!(partition.after.len(), TRANSAXIAL_EVENT_CAP);
}

#[test]
fn test_half_life_of_uniform_times_is_long() {
    // Flat time distribution: the fitted decay is much slower than the run
    let table = synthetic_table(4000);
    let decays = extract_decay_times(&table).unwrap();
    let fit = fit_half_life(&decays.source0).unwrap();
    assert!(fit.half_life().abs() > 2000.0 || fit.half_life().is_infinite());
}
