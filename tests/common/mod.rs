//! Shared record types and backend setup for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rowstore::{
    Column, ConnectionConfig, DataType, DatabaseManager, MemoryBackend, Record, TableColumn,
};

// ---------------------------------------------------------------------------
// Tag: minimal keyed type with a tight text bound
// ---------------------------------------------------------------------------

pub const TAG_ID: usize = 0;
pub const TAG_NAME: usize = 1;

pub struct Tag {
    columns: Vec<Column>,
}

impl Tag {
    pub fn new() -> Self {
        Self {
            columns: vec![
                Column::new(DataType::Integer, TAG_ID),
                Column::new(DataType::Text, TAG_NAME).with_max_length(5),
            ],
        }
    }
}

impl Record for Tag {
    fn table_name(&self) -> &str {
        "tag"
    }

    fn key_ordinals(&self) -> &[usize] {
        &[TAG_ID]
    }

    fn case_sensitive_column_names(&self) -> &[&str] {
        &["TagID", "TagName"]
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

// ---------------------------------------------------------------------------
// CrewMember
// ---------------------------------------------------------------------------

pub const CREW_MEMBER_ID: usize = 0;
pub const CREW_MEMBER_NAME: usize = 1;
pub const CREW_MEMBER_PHONE: usize = 2;
pub const CREW_MEMBER_TYPE: usize = 3;
pub const CREW_MEMBER_IS_LEAD: usize = 4;

pub struct CrewMember {
    columns: Vec<Column>,
}

impl CrewMember {
    pub fn new() -> Self {
        Self {
            columns: vec![
                Column::new(DataType::Integer, CREW_MEMBER_ID),
                Column::new(DataType::Text, CREW_MEMBER_NAME).with_max_length(100),
                Column::new(DataType::Text, CREW_MEMBER_PHONE).with_max_length(255),
                Column::new(DataType::Text, CREW_MEMBER_TYPE).with_max_length(100),
                Column::new(DataType::Boolean, CREW_MEMBER_IS_LEAD),
            ],
        }
    }
}

impl Record for CrewMember {
    fn table_name(&self) -> &str {
        "crewmember"
    }

    fn key_ordinals(&self) -> &[usize] {
        &[CREW_MEMBER_ID]
    }

    fn case_sensitive_column_names(&self) -> &[&str] {
        &[
            "CrewMemberID",
            "CrewMemberName",
            "CrewMemberPhone",
            "CrewMemberType",
            "CrewMemberIsLead",
        ]
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

// ---------------------------------------------------------------------------
// Assignment: carries both timestamp flavors
// ---------------------------------------------------------------------------

pub const ASSIGNMENT_ID: usize = 0;
pub const ASSIGNMENT_CREW_MEMBER_ID: usize = 1;
pub const ASSIGNMENT_START_TIME: usize = 2;
pub const ASSIGNMENT_LAST_SEEN: usize = 3;

pub struct Assignment {
    columns: Vec<Column>,
}

impl Assignment {
    pub fn new() -> Self {
        Self {
            columns: vec![
                Column::new(DataType::Integer, ASSIGNMENT_ID),
                Column::new(DataType::Integer, ASSIGNMENT_CREW_MEMBER_ID),
                Column::new(DataType::DateTime, ASSIGNMENT_START_TIME),
                Column::new(DataType::DateTime2, ASSIGNMENT_LAST_SEEN),
            ],
        }
    }
}

impl Record for Assignment {
    fn table_name(&self) -> &str {
        "assignment"
    }

    fn key_ordinals(&self) -> &[usize] {
        &[ASSIGNMENT_ID]
    }

    fn case_sensitive_column_names(&self) -> &[&str] {
        &[
            "AssignmentID",
            "CrewMemberID",
            "StartTime",
            "LastSeen",
        ]
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

// ---------------------------------------------------------------------------
// Badge: declared spellings that do not match the backend table, so bulk
// loading it fails while statement identifiers still resolve
// ---------------------------------------------------------------------------

pub const BADGE_ID: usize = 0;
pub const BADGE_LABEL: usize = 1;

pub struct Badge {
    columns: Vec<Column>,
}

impl Badge {
    pub fn new() -> Self {
        Self {
            columns: vec![
                Column::new(DataType::Integer, BADGE_ID),
                Column::new(DataType::Text, BADGE_LABEL),
            ],
        }
    }
}

impl Record for Badge {
    fn table_name(&self) -> &str {
        "badge"
    }

    fn key_ordinals(&self) -> &[usize] {
        &[BADGE_ID]
    }

    fn case_sensitive_column_names(&self) -> &[&str] {
        &["BadgeID", "BadgeLabel"]
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

// ---------------------------------------------------------------------------
// Backend / manager setup
// ---------------------------------------------------------------------------

pub fn backend_with_tables() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend
        .create_table(
            "tag",
            vec![
                TableColumn::new("TagID", DataType::Integer),
                TableColumn::new("TagName", DataType::Text),
            ],
        )
        .unwrap();
    backend
        .create_table(
            "crewmember",
            vec![
                TableColumn::new("CrewMemberID", DataType::Integer),
                TableColumn::new("CrewMemberName", DataType::Text),
                TableColumn::new("CrewMemberPhone", DataType::Text),
                TableColumn::new("CrewMemberType", DataType::Text),
                TableColumn::new("CrewMemberIsLead", DataType::Boolean),
            ],
        )
        .unwrap();
    backend
        .create_table(
            "assignment",
            vec![
                TableColumn::new("AssignmentID", DataType::Integer),
                TableColumn::new("CrewMemberID", DataType::Integer),
                TableColumn::new("StartTime", DataType::DateTime),
                TableColumn::new("LastSeen", DataType::DateTime2),
            ],
        )
        .unwrap();
    // Declared in lowercase on purpose: bulk loads against this table fail
    // their case-sensitive column mapping.
    backend
        .create_table(
            "badge",
            vec![
                TableColumn::new("badgeid", DataType::Integer),
                TableColumn::new("badgelabel", DataType::Text),
            ],
        )
        .unwrap();
    backend
}

pub fn manager(backend: &MemoryBackend) -> DatabaseManager {
    DatabaseManager::new(Arc::new(backend.clone()), ConnectionConfig::default())
}

pub fn crew_member(id: i64, name: &str, kind: &str) -> CrewMember {
    use rowstore::Value;
    let mut member = CrewMember::new();
    member.set_value(CREW_MEMBER_ID, Value::Integer(id)).unwrap();
    member.set_value(CREW_MEMBER_NAME, Value::from(name)).unwrap();
    member
        .set_value(CREW_MEMBER_PHONE, Value::from("555-0100"))
        .unwrap();
    member.set_value(CREW_MEMBER_TYPE, Value::from(kind)).unwrap();
    member
        .set_value(CREW_MEMBER_IS_LEAD, Value::Boolean(false))
        .unwrap();
    member
}

pub fn tag(id: i64, name: &str) -> Tag {
    use rowstore::Value;
    let mut tag = Tag::new();
    tag.set_value(TAG_ID, Value::Integer(id)).unwrap();
    tag.set_value(TAG_NAME, Value::from(name)).unwrap();
    tag
}
