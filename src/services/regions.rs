//! Static county table.
//!
//! Maps the county names offered on the page to the CWA township forecast
//! dataset id and, where one is mapped, the observation station used for
//! next-hour temperature prediction.

/// A selectable region (county).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Display name, also the value of the `county` query parameter.
    pub name: &'static str,
    /// CWA township forecast dataset id (`locationId`)
    pub location_id: &'static str,
    /// CWA observation station id (`StationId`), if the region has one
    pub station_id: Option<&'static str>,
}

/// All regions, in display order.
pub const REGIONS: &[Region] = &[
    Region {
        name: "新北市",
        location_id: "F-D0047-069",
        station_id: Some("466881"),
    },
    Region {
        name: "臺北市",
        location_id: "F-D0047-061",
        station_id: Some("466920"),
    },
    Region {
        name: "桃園市",
        location_id: "F-D0047-005",
        station_id: Some("C0C480"),
    },
    Region {
        name: "臺中市",
        location_id: "F-D0047-073",
        station_id: Some("467490"),
    },
    Region {
        name: "高雄市",
        location_id: "F-D0047-065",
        station_id: Some("467441"),
    },
];

/// Look up a region by its exact display name.
pub fn find_region(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.name == name)
}
