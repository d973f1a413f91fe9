//! Natural-key lookups.
//!
//! Every function answers with the surrogate id, or `None` when nothing matches. A miss is never an
//! error; only database failures are.
use crate::error::Result;
use crate::store::models::{Race, Season};
use sqlx::SqliteConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Race,
    Driver,
}

pub async fn country_by_iso(conn: &mut SqliteConnection, iso_code: &str) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar("SELECT id FROM country WHERE iso_code = ?")
        .bind(iso_code)
        .fetch_optional(conn)
        .await?)
}

/// Nationality to country, through the male demonym first and the female one second.
pub async fn country_by_demonym(conn: &mut SqliteConnection, demonym: &str) -> Result<Option<i64>> {
    let demonym = demonym.trim();
    if demonym.is_empty() {
        return Ok(None);
    }

    for column in ["male_demonym", "female_demonym"] {
        let sql = format!("SELECT id FROM country WHERE lower({}) = lower(?) ORDER BY id LIMIT 1", column);
        let found: Option<i64> = sqlx::query_scalar(&sql).bind(demonym).fetch_optional(&mut *conn).await?;
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

/// Exact name, then a whole entry of the alternate spellings, then a fragment of them.
pub async fn country_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<i64>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    let exact: Option<i64> = sqlx::query_scalar("SELECT id FROM country WHERE lower(name) = lower(?) ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    if exact.is_some() {
        return Ok(exact);
    }

    let token: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM country \
         WHERE instr(lower(', ' || alt_spellings || ','), lower(', ' || ? || ',')) > 0 \
         ORDER BY id LIMIT 1",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    if token.is_some() {
        return Ok(token);
    }

    Ok(sqlx::query_scalar("SELECT id FROM country WHERE instr(lower(alt_spellings), lower(?)) > 0 ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(conn)
        .await?)
}

pub async fn season_by_year(conn: &mut SqliteConnection, year: i64) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar("SELECT id FROM season WHERE year = ?")
        .bind(year)
        .fetch_optional(conn)
        .await?)
}

pub async fn status_by_label(conn: &mut SqliteConnection, label: &str, kind: StatusKind) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar(
        "SELECT id FROM status WHERE label = ? AND is_race_status = ? AND is_driver_status = ? ORDER BY id LIMIT 1",
    )
    .bind(label)
    .bind(kind == StatusKind::Race)
    .bind(kind == StatusKind::Driver)
    .fetch_optional(conn)
    .await?)
}

/// A track stored before its country was known still matches once the country resolves.
pub async fn track_by_key(conn: &mut SqliteConnection, name: &str, city: &str, country_id: Option<i64>) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar(
        "SELECT id FROM track WHERE name = ? AND city = ? AND (country_id IS ? OR country_id IS NULL) \
         ORDER BY country_id IS NULL, id LIMIT 1",
    )
    .bind(name)
    .bind(city)
    .bind(country_id)
    .fetch_optional(conn)
    .await?)
}

pub async fn team_by_ref(conn: &mut SqliteConnection, external_ref: &str) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar("SELECT id FROM team WHERE external_ref = ?")
        .bind(external_ref)
        .fetch_optional(conn)
        .await?)
}

pub async fn team_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar("SELECT id FROM team WHERE name = ?")
        .bind(name)
        .fetch_optional(conn)
        .await?)
}

pub async fn team(conn: &mut SqliteConnection, external_ref: Option<&str>, name: &str) -> Result<Option<i64>> {
    if let Some(external_ref) = external_ref {
        if let Some(id) = team_by_ref(&mut *conn, external_ref).await? {
            return Ok(Some(id));
        }
    }
    team_by_name(conn, name).await
}

pub async fn driver_by_ref(conn: &mut SqliteConnection, external_ref: &str) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar("SELECT id FROM driver WHERE external_ref = ?")
        .bind(external_ref)
        .fetch_optional(conn)
        .await?)
}

/// Namesakes are told apart by their three-letter code when both sides carry one.
pub async fn driver_by_name(conn: &mut SqliteConnection, first_name: &str, last_name: &str, code: Option<&str>) -> Result<Option<i64>> {
    let candidates: Vec<(i64, Option<String>)> =
        sqlx::query_as("SELECT id, code_name FROM driver WHERE first_name = ? AND last_name = ? ORDER BY id")
            .bind(first_name)
            .bind(last_name)
            .fetch_all(conn)
            .await?;

    let found = candidates.into_iter().find(|(_, stored)| match (code, stored.as_deref()) {
        (Some(code), Some(stored)) => code.eq_ignore_ascii_case(stored),
        _ => true,
    });
    Ok(found.map(|(id, _)| id))
}

pub async fn driver(
    conn: &mut SqliteConnection,
    external_ref: Option<&str>,
    first_name: &str,
    last_name: &str,
    code: Option<&str>,
) -> Result<Option<i64>> {
    if let Some(external_ref) = external_ref {
        if let Some(id) = driver_by_ref(&mut *conn, external_ref).await? {
            return Ok(Some(id));
        }
    }
    driver_by_name(conn, first_name, last_name, code).await
}

pub async fn race_by_round(conn: &mut SqliteConnection, season_id: i64, round: i64) -> Result<Option<i64>> {
    Ok(sqlx::query_scalar("SELECT id FROM race WHERE season_id = ? AND round = ?")
        .bind(season_id)
        .bind(round)
        .fetch_optional(conn)
        .await?)
}

pub async fn seasons(conn: &mut SqliteConnection) -> Result<Vec<Season>> {
    Ok(sqlx::query_as("SELECT id, year FROM season ORDER BY year").fetch_all(conn).await?)
}

pub async fn races_of_season(conn: &mut SqliteConnection, season_id: i64) -> Result<Vec<Race>> {
    Ok(sqlx::query_as("SELECT * FROM race WHERE season_id = ? ORDER BY round")
        .bind(season_id)
        .fetch_all(conn)
        .await?)
}

pub async fn driver_podiums(conn: &mut SqliteConnection, season_id: i64, driver_id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM result r JOIN race ra ON ra.id = r.race_id \
         WHERE ra.season_id = ? AND r.driver_id = ? AND r.finish_position BETWEEN 1 AND 3",
    )
    .bind(season_id)
    .bind(driver_id)
    .fetch_one(conn)
    .await?)
}

/// Two cars on the podium count as two podiums for the team.
pub async fn team_podiums(conn: &mut SqliteConnection, season_id: i64, team_id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM result r JOIN race ra ON ra.id = r.race_id \
         WHERE ra.season_id = ? AND r.team_id = ? AND r.finish_position BETWEEN 1 AND 3",
    )
    .bind(season_id)
    .bind(team_id)
    .fetch_one(conn)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use crate::store::records::{NewCountry, NewDriver};
    use crate::store::upsert;

    fn country(name: &str, iso: &str, alt: &str, demonym: &str) -> NewCountry {
        NewCountry {
            name: name.to_string(),
            iso_code: iso.to_string(),
            flag_url: None,
            timezone: None,
            alt_spellings: Some(alt.to_string()),
            female_demonym: Some(demonym.to_string()),
            male_demonym: Some(demonym.to_string()),
        }
    }

    async fn seeded() -> Database {
        let db = Database::in_memory().await.unwrap();
        let mut tx = db.begin().await.unwrap();
        upsert(&mut tx, &country("United Kingdom", "GBR", "GB, UK, Great Britain", "British")).await.unwrap();
        upsert(&mut tx, &country("United States", "USA", "US, USA, United States of America", "American")).await.unwrap();
        upsert(&mut tx, &country("Monaco", "MCO", "MC, Principality of Monaco", "Monegasque")).await.unwrap();
        tx.commit().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_country_by_name_fallbacks() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let uk = country_by_iso(&mut conn, "GBR").await.unwrap();
        assert!(uk.is_some());
        assert_eq!(country_by_name(&mut conn, "United Kingdom").await.unwrap(), uk);
        assert_eq!(country_by_name(&mut conn, "UK").await.unwrap(), uk);
        assert_eq!(country_by_name(&mut conn, "Principality").await.unwrap(), country_by_iso(&mut conn, "MCO").await.unwrap());
        assert_eq!(country_by_name(&mut conn, "Atlantis").await.unwrap(), None);
        assert_eq!(country_by_name(&mut conn, "  ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_whole_spelling_and_fragment() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let usa = country_by_iso(&mut conn, "USA").await.unwrap();
        assert_eq!(country_by_name(&mut conn, "US").await.unwrap(), usa);
        assert_eq!(country_by_name(&mut conn, "Britain").await.unwrap(), country_by_iso(&mut conn, "GBR").await.unwrap());
    }

    #[tokio::test]
    async fn test_country_by_demonym() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let uk = country_by_iso(&mut conn, "GBR").await.unwrap();
        assert_eq!(country_by_demonym(&mut conn, "british").await.unwrap(), uk);
        assert_eq!(country_by_demonym(&mut conn, "United Kingdom").await.unwrap(), None);
        assert_eq!(country_by_demonym(&mut conn, "").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_driver_narrowed_by_code() {
        let db = Database::in_memory().await.unwrap();
        let mut tx = db.begin().await.unwrap();

        let senior = NewDriver::named("Michael", "Schumacher").with_code(Some("MSC")).with_ref(Some("michael_schumacher"));
        let junior = NewDriver::named("Michael", "Schumacher").with_code(Some("MSJ"));
        let senior_id = upsert(&mut tx, &senior).await.unwrap().into_key();
        // Same name, different code: a second row
        let junior_id = upsert(&mut tx, &junior).await.unwrap().into_key();
        assert_ne!(senior_id, junior_id);

        assert_eq!(driver_by_name(&mut tx, "Michael", "Schumacher", Some("MSJ")).await.unwrap(), Some(junior_id));
        assert_eq!(driver_by_name(&mut tx, "Michael", "Schumacher", None).await.unwrap(), Some(senior_id));
        assert_eq!(driver(&mut tx, Some("michael_schumacher"), "x", "y", None).await.unwrap(), Some(senior_id));
        assert_eq!(driver(&mut tx, Some("unknown"), "Nico", "Rosberg", None).await.unwrap(), None);
    }
}
