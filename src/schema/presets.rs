use super::{SchemaDescriptor, TableBreakdown};

/// Databases known at build time.
pub fn preset_schemas() -> Vec<SchemaDescriptor> {
    vec![fest_management()]
}

fn fest_management() -> SchemaDescriptor {
    let link = &[
        "FEST_ID (numeric)",
        "EVENT_ID (numeric)",
        "PRIMARY KEY (FEST_ID, EVENT_ID)",
    ];

    SchemaDescriptor::new(
        0,
        "21CS10014",
        "Fest Management System",
        vec![
            TableBreakdown::new("ADMIN", &["USERNAME (PRIMARY KEY) (text)", "PASS (text)"]),
            TableBreakdown::new(
                "STUDENT",
                &[
                    "FEST_ID (PRIMARY KEY) (numeric)",
                    "NAME (text)",
                    "ROLL (text)",
                    "DEPT (text)",
                    "PASS (text)",
                ],
            ),
            TableBreakdown::new(
                "EVENT",
                &[
                    "EVENT_ID (PRIMARY KEY) (numeric)",
                    "EVENT_NAME (text)",
                    "EVENT_DATE (date)",
                    "EVENT_TIME (time)",
                    "EVENT_VENUE (text)",
                    "EVENT_TYPE (text)",
                    "EVENT_DESCRIPTION (text)",
                    "EVENT_WINNER (numeric)",
                ],
            ),
            TableBreakdown::new(
                "ACCOMODATION",
                &["ACC_ID (numeric) (PRIMARY KEY)", "NAME (text)", "CAPACITY (numeric)"],
            ),
            TableBreakdown::new(
                "EXT_PARTICIPANT",
                &[
                    "FEST_ID (numeric) (PRIMARY KEY)",
                    "NAME (text)",
                    "COLLEGE (text)",
                    "ACC_ID (numeric)",
                    "PASS (text)",
                ],
            ),
            TableBreakdown::new("ORGANISING", link),
            TableBreakdown::new("VOLUNTEERING", link),
            TableBreakdown::new("PARTICIPATING_EXT", link),
            TableBreakdown::new("PARTICIPATING_INT", link),
        ],
    )
}
