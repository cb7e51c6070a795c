pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
  id TEXT PRIMARY KEY,
  start DATETIME NOT NULL,
  finish DATETIME
);

CREATE TABLE IF NOT EXISTS results (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT,
  runid TEXT REFERENCES runs(id),
  "desc" TEXT,
  result TEXT,
  msg TEXT,
  start DATETIME NOT NULL,
  finish DATETIME
);

CREATE TABLE IF NOT EXISTS props (
  id INTEGER,
  key TEXT,
  value TEXT,
  PRIMARY KEY (id, key)
);
"#;
