//! File-backed store tests
//!
//! Records written through one handle must be visible after the store is
//! reopened from the same connection string.

use quake_store::{connect, StoreConfig};
use quake_types::filter::RecordFilter;
use quake_types::record::EarthquakeRecord;

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("quakes.db").display());

    {
        let store = connect(&url, StoreConfig::default()).await.unwrap();
        store
            .insert_record(&EarthquakeRecord::new(5.2, 34.1, -118.2))
            .await
            .unwrap();
        store
            .insert_record(&EarthquakeRecord::new(2.0, -12.0, 45.0).with_coordinates())
            .await
            .unwrap();
    }

    let reopened = connect(&url, StoreConfig::default()).await.unwrap();
    let all = reopened.find_records(RecordFilter::All).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], EarthquakeRecord::new(5.2, 34.1, -118.2));
    assert_eq!(all[1].coordinates, Some(vec![45.0, -12.0]));

    let strong = reopened
        .find_records(RecordFilter::MinMagnitude(4.0))
        .await
        .unwrap();
    assert_eq!(strong, vec![EarthquakeRecord::new(5.2, 34.1, -118.2)]);
}

#[tokio::test]
async fn test_reinsertion_duplicates() {
    let store = connect("sqlite::memory:", StoreConfig::default())
        .await
        .unwrap();
    let record = EarthquakeRecord::new(4.4, 1.0, 1.0);

    for _ in 0..3 {
        store.insert_record(&record).await.unwrap();
    }

    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_unreachable_path_fails_to_connect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}",
        dir.path().join("missing").join("nested").join("quakes.db").display()
    );

    assert!(connect(&url, StoreConfig::default()).await.is_err());
}
