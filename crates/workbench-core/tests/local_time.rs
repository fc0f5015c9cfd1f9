use workbench_core::format::format_date_time;
use workbench_core::time::format_wire_datetime;

// One test per binary: the zone is process-wide.
#[test]
fn server_times_render_under_a_non_utc_zone() {
    std::env::set_var("TZ", "America/New_York");

    assert_eq!(
        format_date_time(Some("2025-01-02T10:00:00")),
        "2025-01-02 10:00"
    );
    assert_eq!(
        format_date_time(Some("2025-01-02T10:00:00.250")),
        "2025-01-02 10:00"
    );
    assert_eq!(
        format_wire_datetime("2025-01-02T15:00:00Z").expect("format"),
        "2025-01-02 10:00"
    );
}
