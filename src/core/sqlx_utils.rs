use chrono::{DateTime, FixedOffset};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    Postgres,
};

#[derive(Clone, Debug, PartialEq)]
pub enum SqlxBinds {
    String(String),
    OptionString(Option<String>),
    Bool(bool),
    DateTimeFixedOffset(DateTime<FixedOffset>),
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, PgRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Postgres, T, PgArguments> {
    let mut q: QueryAs<'_, Postgres, T, PgArguments> = sqlx::query_as(stmt);
    for bind in binds.iter() {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val.clone()),
            SqlxBinds::OptionString(val) => q.bind(val.clone()),
            SqlxBinds::Bool(val) => q.bind(*val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(*val),
        };
    }
    q
}

pub fn query_builder(
    select: Option<String>,
    table_name: &str,
    wheres: &[String],
    limit: Option<u32>,
) -> String {
    // Select
    let mut stmt = "SELECT ".to_string();
    if let Some(val) = select {
        stmt.push_str(&val);
    } else {
        stmt.push('*');
    }

    // From
    stmt.push_str(format!(" FROM {}", table_name).as_str());

    // Where
    if !wheres.is_empty() {
        stmt.push_str(" WHERE ");
        stmt.push_str(&wheres.join(" AND "));
    }

    // Limit
    if let Some(limit) = limit {
        stmt.push_str(format!(" LIMIT {}", limit).as_str());
    }
    stmt
}

/// `INSERT .. ON CONFLICT (<conflict_column>) DO UPDATE .. RETURNING *` over
/// the given columns. Placeholders follow column order, so binds must be
/// pushed in the same order. The conflict column is never overwritten.
pub fn upsert_builder(table_name: &str, columns: &[&str], conflict_column: &str) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|idx| format!("${}", idx)).collect();
    let updates: Vec<String> = columns
        .iter()
        .filter(|column| **column != conflict_column)
        .map(|column| format!("{0} = EXCLUDED.{0}", column))
        .collect();
    let mut stmt = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({})",
        table_name,
        columns.join(", "),
        placeholders.join(", "),
        conflict_column
    );
    if updates.is_empty() {
        stmt.push_str(" DO NOTHING");
    } else {
        stmt.push_str(" DO UPDATE SET ");
        stmt.push_str(&updates.join(", "));
    }
    stmt.push_str(" RETURNING *");
    stmt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let stmt = query_builder(
            None,
            "public.profiles",
            &["user_id = $1".to_string()],
            Some(1),
        );
        assert_eq!(
            stmt,
            "SELECT * FROM public.profiles WHERE user_id = $1 LIMIT 1"
        );
    }

    #[test]
    fn test_query_builder_multiple_wheres() {
        let stmt = query_builder(
            Some("count(user_id)".to_string()),
            "public.profiles",
            &["user_id = $1".to_string(), "location = $2".to_string()],
            None,
        );
        assert_eq!(
            stmt,
            "SELECT count(user_id) FROM public.profiles WHERE user_id = $1 AND location = $2"
        );
    }

    #[test]
    fn test_upsert_builder() {
        let stmt = upsert_builder(
            "public.profiles",
            &["user_id", "avatar_url", "updated_at"],
            "user_id",
        );
        assert_eq!(
            stmt,
            "INSERT INTO public.profiles (user_id, avatar_url, updated_at) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET avatar_url = EXCLUDED.avatar_url, \
             updated_at = EXCLUDED.updated_at RETURNING *"
        );
    }
}
