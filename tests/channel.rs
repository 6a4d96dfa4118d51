use enginemdf::{Channel, Closed, Error, Metadata, MetadataValue, Result, TimeSeries};

#[test]
fn engine_speed_slice() -> Result<()> {
    let rpm = Channel::new("rpm", [0.0, 1.0, 2.0], [800.0, 1200.0, 1500.0], "rpm")?;
    let sliced = rpm.time_slice(1.0, 2.0);

    assert_eq!(sliced.time().as_slice(), &[1.0, 2.0]);
    assert_eq!(sliced.data(), &[1200.0, 1500.0]);
    assert_eq!(sliced.name(), "rpm");
    assert_eq!(sliced.unit(), "rpm");
    Ok(())
}

#[test]
fn length_mismatch_is_rejected() {
    let err = Channel::new("rpm", [0.0, 1.0], [1.0, 2.0, 3.0], "rpm").unwrap_err();
    match err {
        Error::ChannelValidation(msg) => {
            assert!(msg.contains('3') && msg.contains('2'), "{msg}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn blank_labels_are_rejected() {
    assert!(matches!(
        Channel::new("", [0.0], [1.0], "rpm"),
        Err(Error::ChannelValidation(_))
    ));
    assert!(matches!(
        Channel::new("rpm", [0.0], [1.0], "  "),
        Err(Error::ChannelValidation(_))
    ));
}

#[test]
fn invalid_time_base_propagates() {
    assert!(matches!(
        Channel::new("rpm", [1.0, 0.0], [1.0, 2.0], "rpm"),
        Err(Error::TimeSeriesConsistency(_))
    ));
    assert!(matches!(
        Channel::new("rpm", Vec::<f64>::new(), Vec::<f64>::new(), "rpm"),
        Err(Error::TimeSeriesConsistency(_))
    ));
}

#[test]
fn data_may_hold_invalid_samples() -> Result<()> {
    let ch = Channel::new("temp", [0.0, 1.0, 2.0], [20.0, f64::NAN, 22.0], "degC")?;
    assert_eq!(ch.mean(), Some(21.0));
    assert_eq!(ch.std_dev(0), Some(1.0));
    assert_eq!(ch.std_dev(2), None);
    Ok(())
}

#[test]
fn channels_with_invalid_samples_compare_equal() -> Result<()> {
    let ch = Channel::new("temp", [0.0, 1.0, 2.0, 3.0], [20.0, f64::NAN, 22.0, 23.0], "degC")?;
    assert_eq!(ch.clone(), ch);

    let once = ch.time_slice(0.5, 2.5);
    let twice = once.time_slice(0.5, 2.5);
    assert_eq!(twice, once);
    assert_eq!(once.len(), 2);

    let other = Channel::new("temp", [0.0, 1.0, 2.0, 3.0], [20.0, 21.0, 22.0, 23.0], "degC")?;
    assert_ne!(other, ch);
    Ok(())
}

#[test]
fn slice_and_mask_keep_metadata() -> Result<()> {
    let mut meta = Metadata::new();
    meta.insert("source".into(), MetadataValue::from("MDF:RecResult"));
    let ch = Channel::with_metadata("torque", [0.0, 0.5, 1.0, 1.5], [1.0, -2.0, 3.0, -4.0], "Nm", meta)?;

    let positive = ch.mask(|_, _, v| v > 0.0);
    assert_eq!(positive.time().as_slice(), &[0.0, 1.0]);
    assert_eq!(positive.data(), &[1.0, 3.0]);
    assert_eq!(positive.metadata(), ch.metadata());

    let open = ch.time_slice_closed(0.0, 1.5, Closed::Neither);
    assert_eq!(open.data(), &[-2.0, 3.0]);
    assert_eq!(open.metadata()["source"].as_text(), Some("MDF:RecResult"));

    let none = ch.time_slice(10.0, 20.0);
    assert!(none.is_empty());
    assert!(none.data().is_empty());
    Ok(())
}

#[test]
fn transformations_return_new_channels() -> Result<()> {
    let ch = Channel::new("spd", [0.0, 1.0], [10.0, 20.0], "km/h")?;

    let renamed = ch.renamed("vehicle_speed")?;
    assert_eq!(renamed.name(), "vehicle_speed");
    assert_eq!(ch.name(), "spd");
    assert!(ch.renamed(" ").is_err());

    let mph = ch.with_unit("mph")?;
    assert_eq!(mph.unit(), "mph");
    assert!(ch.with_unit("").is_err());

    let tagged = ch.with_metadata_entry("calibrated", true);
    assert_eq!(tagged.metadata()["calibrated"], MetadataValue::Bool(true));
    assert!(ch.metadata().is_empty());
    assert_eq!(tagged.time(), ch.time());
    Ok(())
}

#[test]
fn shared_time_base() -> Result<()> {
    let time = TimeSeries::new([0.0, 0.1, 0.2])?;
    let a = Channel::from_series("a", time.clone(), [1.0, 2.0, 3.0], "V", Metadata::new())?;
    let b = Channel::from_series("b", time.clone(), [4.0, 5.0, 6.0], "V", Metadata::new())?;
    assert!(a.time().is_consistent_with(b.time(), 0.0));
    assert!(Channel::from_series("c", time, [1.0], "V", Metadata::new()).is_err());
    Ok(())
}
