//! Time selection flow across collection, slider and layer types.

use chrono::{FixedOffset, TimeZone};
use explorer_common::{
    display_date, normalize_local_picker_input_to_utc_midnight, parse_duration_ms, parse_instant,
    picker_display_instant, Collection, LayerConfig, LayerId, RenderConfig, SliderWindow,
};

const GFS_YAML: &str = r#"
id: noaa-gfs
tiler: "https://tiler.example.com/tiles/{z}/{x}/{y}"
timeseries_type: forecast
renders:
  temperature_2m:
    colormap_name: viridis
"#;

#[test]
fn test_open_extent_falls_back_to_latest_cycle() {
    let collection = Collection::from_yaml(GFS_YAML).unwrap();
    let now = parse_instant("2024-06-19T13:10:00Z").unwrap();

    assert_eq!(collection.max_date(now), parse_instant("2024-06-19T12:00:00Z").unwrap());
    assert_eq!(collection.min_date().timestamp(), 0);
}

#[test]
fn test_picker_to_slider_to_layer() {
    let collection = Collection::from_yaml(GFS_YAML).unwrap();
    let layer = LayerConfig {
        id: LayerId::generate(),
        name: collection.id.clone(),
        is_visible: true,
        timeseries_type: collection.timeseries_type,
        render_config: RenderConfig {
            collection: collection.id.clone(),
            variable: "temperature_2m".to_string(),
            render_option: Some("temperature_2m".to_string()),
            datetime_str: None,
            reference_dt_str: None,
        },
    };

    // Picked in Tokyo just after local midnight
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let picked = tokyo.with_ymd_and_hms(2024, 6, 19, 0, 5, 0).unwrap();
    let start = normalize_local_picker_input_to_utc_midnight(&picked);
    assert_eq!(start, parse_instant("2024-06-19T00:00:00Z").unwrap());

    let window = SliderWindow::forecast(start).unwrap();
    assert_eq!(window.step_ms, parse_duration_ms("PT1H").unwrap());
    assert_eq!(window.ticks().len(), 49);

    let layer = layer.with_reference_time(&start);
    let valid = window.snap(parse_instant("2024-06-19T05:40:00Z").unwrap());
    let layer = layer.with_valid_time(&valid);

    assert_eq!(
        layer.render_config.time_selection(),
        Some(("2024-06-19T00:00:00.000Z", "2024-06-19T06:00:00.000Z"))
    );
    assert_eq!(
        display_date(Some(valid.timestamp_millis())).as_deref(),
        Some("Wed, 19 Jun 2024 06:00:00 GMT")
    );

    // The picker shows the stored UTC date in its own zone
    let shown = picker_display_instant(start, &tokyo).with_timezone(&tokyo);
    assert_eq!(shown.date_naive(), start.date_naive());
}
