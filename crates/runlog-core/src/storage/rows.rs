//! Read-back row structs. Timestamps stay in their stored text form
//! (fixed-width RFC 3339, UTC), so string order equals temporal order.

#[derive(Debug, Clone)]
pub struct RunRow {
    pub id: String,
    pub start: String,
    pub finish: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TestRow {
    pub id: i64,
    pub name: String,
    pub runid: String,
    pub desc: Option<String>,
    pub result: Option<String>,
    pub msg: Option<String>,
    pub start: String,
    pub finish: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PropertyRow {
    pub id: i64,
    pub key: String,
    pub value: String,
}
