//! Parameterized SQL rendering for query plans
//!
//! Values never reach the SQL text: every predicate value is bound through a
//! numbered `?N` placeholder.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;

use super::{Field, Operator, PlanValue, Predicate};

/// Format of bound timestamps. Milliseconds are the finest resolution
/// SQLite's date functions keep.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// SQL function folding text for case-insensitive matching. Registered on
/// every store connection and backed by [`fold_case`].
pub const FOLD_CASE_FN: &str = "fold_case";

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Drop precision below what a bound timestamp carries.
pub fn truncate_timestamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Unicode lowercase fold applied to both sides of a substring match.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Stored timestamps come in several textual layouts; compare them as
/// instants, never as text.
pub fn instant(expr: &str) -> String {
    format!("julianday({})", expr)
}

/// A bound SQL argument
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Integer(i64),
}

impl ToSql for SqlArg {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlArg::Text(s) => s.to_sql(),
            SqlArg::Integer(n) => n.to_sql(),
        }
    }
}

impl From<&PlanValue> for SqlArg {
    fn from(value: &PlanValue) -> Self {
        match value {
            PlanValue::Text(s) => SqlArg::Text(s.clone()),
            PlanValue::Timestamp(at) => SqlArg::Text(format_timestamp(at)),
        }
    }
}

/// Rendered SQL with its positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

/// Incremental `SELECT` builder
#[derive(Debug, Default)]
pub struct SelectBuilder {
    columns: Vec<String>,
    from: String,
    joins: Vec<String>,
    wheres: Vec<String>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    args: Vec<SqlArg>,
}

impl SelectBuilder {
    pub fn select<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = table.into();
        self
    }

    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Bind an argument and return its placeholder.
    pub fn bind(&mut self, arg: SqlArg) -> String {
        self.args.push(arg);
        format!("?{}", self.args.len())
    }

    /// Add a condition; conditions are joined with `AND`.
    pub fn and_where(&mut self, condition: impl Into<String>) {
        self.wheres.push(condition.into());
    }

    /// Bind `arg` and add the condition produced from its placeholder.
    pub fn where_bound(mut self, arg: SqlArg, condition: impl FnOnce(&str) -> String) -> Self {
        let placeholder = self.bind(arg);
        self.and_where(condition(&placeholder));
        self
    }

    pub fn predicates(mut self, predicates: &[Predicate]) -> Self {
        for predicate in predicates {
            render_predicate(&mut self, predicate);
        }
        self
    }

    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(mut self) -> Statement {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.from);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.wheres.join(" AND "));
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            let placeholder = self.bind(SqlArg::Integer(limit));
            sql.push_str(&format!(" LIMIT {}", placeholder));
        }
        if let Some(offset) = self.offset {
            let placeholder = self.bind(SqlArg::Integer(offset));
            sql.push_str(&format!(" OFFSET {}", placeholder));
        }

        Statement {
            sql,
            args: self.args,
        }
    }
}

/// Escape `LIKE` metacharacters so the needle matches literally.
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn column(field: Field) -> &'static str {
    match field {
        Field::IndicatorType => "i.type",
        Field::IndicatorValue => "i.value",
        Field::ThreatActor => "ia.actor_id",
        Field::Campaign => "ic.campaign_id",
        Field::FirstSeen => "i.first_seen",
        Field::LastSeen => "i.last_seen",
        Field::ObservedAt => "COALESCE(i.first_seen, ic.added_at)",
        Field::CreatedAt => "i.created_at",
    }
}

fn comparison(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "=",
        Operator::ContainsIgnoreCase => "LIKE",
        Operator::GtOrEq => ">=",
        Operator::LtOrEq => "<=",
    }
}

fn render_predicate(builder: &mut SelectBuilder, predicate: &Predicate) {
    let arg = match (predicate.op, &predicate.value) {
        (Operator::ContainsIgnoreCase, PlanValue::Text(needle)) => {
            SqlArg::Text(format!("%{}%", escape_like(&fold_case(needle))))
        }
        (_, value) => SqlArg::from(value),
    };
    let placeholder = builder.bind(arg);

    let condition = match (predicate.field, predicate.op) {
        // Link-table filters match through EXISTS so result rows stay distinct
        (Field::ThreatActor, op) => format!(
            "EXISTS (SELECT 1 FROM indicator_actors ia WHERE ia.indicator_id = i.id AND {} {} {})",
            column(Field::ThreatActor),
            comparison(op),
            placeholder
        ),
        (Field::Campaign, op) => format!(
            "EXISTS (SELECT 1 FROM indicator_campaigns ic WHERE ic.indicator_id = i.id AND {} {} {})",
            column(Field::Campaign),
            comparison(op),
            placeholder
        ),
        (field, Operator::ContainsIgnoreCase) => format!(
            "{}({}) LIKE {} ESCAPE '\\'",
            FOLD_CASE_FN,
            column(field),
            placeholder
        ),
        (field, op) if matches!(predicate.value, PlanValue::Timestamp(_)) => format!(
            "{} {} {}",
            instant(column(field)),
            comparison(op),
            instant(&placeholder)
        ),
        (field, op) => format!("{} {} {}", column(field), comparison(op), placeholder),
    };
    builder.and_where(condition);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_build_full_statement() {
        let stmt = SelectBuilder::select(["i.id", "i.value"])
            .from("indicators i")
            .where_bound(SqlArg::Text("ip".into()), |p| format!("i.type = {}", p))
            .order_by("i.created_at DESC")
            .limit(20)
            .offset(40)
            .build();

        assert_eq!(
            stmt.sql,
            "SELECT i.id, i.value FROM indicators i WHERE i.type = ?1 ORDER BY i.created_at DESC LIMIT ?2 OFFSET ?3"
        );
        assert_eq!(
            stmt.args,
            vec![
                SqlArg::Text("ip".into()),
                SqlArg::Integer(20),
                SqlArg::Integer(40)
            ]
        );
    }

    #[test]
    fn test_build_without_where() {
        let stmt = SelectBuilder::select(["COUNT(*)"]).from("indicators i").build();
        assert_eq!(stmt.sql, "SELECT COUNT(*) FROM indicators i");
        assert!(stmt.args.is_empty());
    }

    #[test]
    fn test_contains_is_escaped_and_lowercased() {
        let predicates = [Predicate {
            field: Field::IndicatorValue,
            op: Operator::ContainsIgnoreCase,
            value: PlanValue::Text("100%_Evil".into()),
        }];
        let stmt = SelectBuilder::select(["i.id"])
            .from("indicators i")
            .predicates(&predicates)
            .build();

        assert!(stmt.sql.contains("fold_case(i.value) LIKE ?1 ESCAPE '\\'"));
        assert_eq!(stmt.args, vec![SqlArg::Text("%100\\%\\_evil%".into())]);
    }

    #[test]
    fn test_contains_folds_unicode() {
        let predicates = [Predicate {
            field: Field::IndicatorValue,
            op: Operator::ContainsIgnoreCase,
            value: PlanValue::Text("ÉVIL".into()),
        }];
        let stmt = SelectBuilder::select(["i.id"])
            .from("indicators i")
            .predicates(&predicates)
            .build();

        assert_eq!(stmt.args, vec![SqlArg::Text("%évil%".into())]);
        assert_eq!(fold_case("ÉVIL.Example"), "évil.example");
    }

    #[test]
    fn test_timestamp_predicates_compare_instants() {
        let at = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();
        let predicates = [Predicate {
            field: Field::FirstSeen,
            op: Operator::GtOrEq,
            value: PlanValue::Timestamp(at),
        }];
        let stmt = SelectBuilder::select(["i.id"])
            .from("indicators i")
            .predicates(&predicates)
            .build();

        assert!(stmt.sql.ends_with("WHERE julianday(i.first_seen) >= julianday(?1)"));
    }

    #[test]
    fn test_link_filters_use_exists() {
        let predicates = [
            Predicate {
                field: Field::ThreatActor,
                op: Operator::Eq,
                value: PlanValue::Text("ta-1".into()),
            },
            Predicate {
                field: Field::Campaign,
                op: Operator::Eq,
                value: PlanValue::Text("c-1".into()),
            },
        ];
        let stmt = SelectBuilder::select(["i.id"])
            .from("indicators i")
            .predicates(&predicates)
            .build();

        assert!(stmt.sql.contains("EXISTS (SELECT 1 FROM indicator_actors ia"));
        assert!(stmt.sql.contains("EXISTS (SELECT 1 FROM indicator_campaigns ic"));
        assert_eq!(stmt.args.len(), 2);
    }

    #[test]
    fn test_timestamp_argument_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            SqlArg::from(&PlanValue::Timestamp(at)),
            SqlArg::Text("2024-03-04T05:06:07.000Z".into())
        );

        let fractional = at + chrono::Duration::microseconds(900_500);
        assert_eq!(
            SqlArg::from(&PlanValue::Timestamp(fractional)),
            SqlArg::Text("2024-03-04T05:06:07.900Z".into())
        );
        assert_eq!(
            truncate_timestamp(fractional),
            at + chrono::Duration::milliseconds(900)
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(escape_like("plain"), "plain");
    }
}
