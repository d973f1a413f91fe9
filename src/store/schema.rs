/// Tracker schema. Every statement is idempotent so it runs on each connect.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS country (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  iso_code TEXT NOT NULL UNIQUE,
  flag_url TEXT NULL,
  timezone TEXT NULL,
  alt_spellings TEXT NULL,
  female_demonym TEXT NULL,
  male_demonym TEXT NULL
);

CREATE TABLE IF NOT EXISTS season (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  year INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS status (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  label TEXT NOT NULL,
  is_race_status INTEGER NOT NULL DEFAULT 0,
  is_driver_status INTEGER NOT NULL DEFAULT 0,
  UNIQUE (label, is_race_status, is_driver_status)
);

CREATE TABLE IF NOT EXISTS driver (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  first_name TEXT NOT NULL,
  last_name TEXT NOT NULL,
  birth_date TEXT NULL,
  birth_country INTEGER NULL REFERENCES country(id),
  code_name TEXT NULL,
  grid_number INTEGER NULL,
  team_id INTEGER NULL REFERENCES team(id),
  external_ref TEXT NULL UNIQUE
);
CREATE INDEX IF NOT EXISTS driver_name_idx ON driver(first_name, last_name);

CREATE TABLE IF NOT EXISTS track (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  city TEXT NOT NULL,
  country_id INTEGER NULL REFERENCES country(id),
  turns_number INTEGER NOT NULL DEFAULT 0,
  best_lap REAL NULL,
  best_lap_driver INTEGER NULL REFERENCES driver(id),
  timezone TEXT NULL,
  geojson_data TEXT NOT NULL DEFAULT '{}',
  corners TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS track_name_city_idx ON track(name, city);

CREATE TABLE IF NOT EXISTS team (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE,
  country_id INTEGER NULL REFERENCES country(id),
  team_manager TEXT NULL,
  is_engine_constructor INTEGER NOT NULL DEFAULT 0,
  engine_constructor TEXT NULL,
  main_color TEXT NOT NULL DEFAULT '#FFFFFF',
  external_ref TEXT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS race (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  season_id INTEGER NOT NULL REFERENCES season(id),
  track_id INTEGER NOT NULL REFERENCES track(id),
  name TEXT NOT NULL,
  race_date TEXT NOT NULL,
  first_practice_date TEXT NULL,
  second_practice_date TEXT NULL,
  third_practice_date TEXT NULL,
  qualifying_date TEXT NULL,
  sprint_date TEXT NULL,
  round INTEGER NOT NULL,
  status_id INTEGER NULL REFERENCES status(id),
  UNIQUE (season_id, round)
);

CREATE TABLE IF NOT EXISTS result (
  race_id INTEGER NOT NULL REFERENCES race(id),
  driver_id INTEGER NOT NULL REFERENCES driver(id),
  team_id INTEGER NOT NULL REFERENCES team(id),
  start_position INTEGER NOT NULL,
  finish_position INTEGER NULL,
  best_lap_time REAL NULL,
  points REAL NOT NULL DEFAULT 0,
  status_id INTEGER NULL REFERENCES status(id),
  PRIMARY KEY (race_id, driver_id, team_id)
);

CREATE TABLE IF NOT EXISTS standing (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  season_id INTEGER NOT NULL REFERENCES season(id),
  driver_id INTEGER NULL REFERENCES driver(id),
  team_id INTEGER NULL REFERENCES team(id),
  points REAL NOT NULL DEFAULT 0,
  position INTEGER NULL,
  victories INTEGER NOT NULL DEFAULT 0,
  podiums INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS standing_season_idx ON standing(season_id);

CREATE TABLE IF NOT EXISTS pitstop (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  race_id INTEGER NOT NULL REFERENCES race(id),
  driver_id INTEGER NOT NULL REFERENCES driver(id),
  lap INTEGER NOT NULL,
  stop INTEGER NOT NULL,
  stop_time TEXT NULL,
  duration REAL NULL,
  UNIQUE (race_id, driver_id, stop)
);
"#;
