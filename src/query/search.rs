//! Indicator search composition

use super::sql::{SelectBuilder, Statement, instant, truncate_timestamp};
use super::{Field, Operator, Pagination, QueryPlan, total_pages};
use crate::cache::ResourceKind;
use crate::models::{DEFAULT_LIMIT, IndicatorSearchResult, MAX_LIMIT, SearchParams, SearchResult};

const SEARCH_COLUMNS: [&str; 7] = [
    "i.id",
    "i.type",
    "i.value",
    "i.confidence",
    "i.first_seen",
    "(SELECT COUNT(*) FROM indicator_campaigns ic WHERE ic.indicator_id = i.id) AS campaign_count",
    "(SELECT COUNT(*) FROM indicator_actors ia WHERE ia.indicator_id = i.id) AS threat_actor_count",
];

/// A composed search: the normalized query and its row and count statements.
///
/// Both statements carry the same filter predicates; only the row statement
/// is ordered and paginated.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub params: SearchParams,
    pub plan: QueryPlan,
    pub rows: Statement,
    pub count: Statement,
}

impl SearchPlan {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.params.page,
            limit: self.params.limit,
        }
    }

    /// Assemble the result page from fetched rows and the total match count.
    pub fn to_result(&self, data: Vec<IndicatorSearchResult>, total: u64) -> SearchResult {
        SearchResult {
            data,
            total,
            page: self.params.page,
            limit: self.params.limit,
            total_pages: total_pages(total, self.params.limit),
        }
    }
}

/// Apply pagination defaults and drop empty filters.
///
/// Non-positive page or limit becomes the default; a limit above the maximum
/// is clamped to it. Time bounds keep millisecond precision, matching the
/// bound SQL value.
pub fn normalize_search(params: &SearchParams) -> SearchParams {
    let mut normalized = params.clone();

    if normalized.page < 1 {
        normalized.page = 1;
    }
    if normalized.limit < 1 {
        normalized.limit = DEFAULT_LIMIT;
    } else if normalized.limit > MAX_LIMIT {
        normalized.limit = MAX_LIMIT;
    }

    for filter in [
        &mut normalized.value,
        &mut normalized.threat_actor_id,
        &mut normalized.campaign_id,
    ] {
        if filter.as_deref().is_some_and(str::is_empty) {
            *filter = None;
        }
    }

    normalized.first_seen_after = normalized.first_seen_after.map(truncate_timestamp);
    normalized.last_seen_before = normalized.last_seen_before.map(truncate_timestamp);

    normalized
}

pub fn compose_search(params: &SearchParams) -> SearchPlan {
    let params = normalize_search(params);
    let pagination = Pagination {
        page: params.page,
        limit: params.limit,
    };

    let plan = QueryPlan::builder(ResourceKind::IndicatorSearch.namespace())
        .filter_text(
            Field::IndicatorType,
            Operator::Eq,
            params.indicator_type.map(|t| t.as_str()),
        )
        .filter_text(
            Field::IndicatorValue,
            Operator::ContainsIgnoreCase,
            params.value.as_deref(),
        )
        .filter_text(Field::ThreatActor, Operator::Eq, params.threat_actor_id.as_deref())
        .filter_text(Field::Campaign, Operator::Eq, params.campaign_id.as_deref())
        .filter_time(Field::FirstSeen, Operator::GtOrEq, params.first_seen_after)
        .filter_time(Field::LastSeen, Operator::LtOrEq, params.last_seen_before)
        .paginate(pagination)
        .build();

    let rows = SelectBuilder::select(SEARCH_COLUMNS)
        .from("indicators i")
        .predicates(plan.predicates())
        .order_by(format!("{} DESC", instant("i.created_at")))
        .order_by("i.id ASC")
        .limit(pagination.limit)
        .offset(pagination.offset())
        .build();

    let count = SelectBuilder::select(["COUNT(*)"])
        .from("indicators i")
        .predicates(plan.without_pagination().predicates())
        .build();

    SearchPlan {
        params,
        plan,
        rows,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorType;
    use crate::query::SqlArg;

    #[test]
    fn test_pagination_defaults() {
        let plan = compose_search(&SearchParams::new().page(0).limit(0));
        assert_eq!(plan.params.page, 1);
        assert_eq!(plan.params.limit, 20);
    }

    #[test]
    fn test_limit_clamped() {
        let plan = compose_search(&SearchParams::new().limit(500));
        assert_eq!(plan.params.limit, 100);

        let plan = compose_search(&SearchParams::new().page(-3).limit(-1));
        assert_eq!(plan.params.page, 1);
        assert_eq!(plan.params.limit, 20);
    }

    #[test]
    fn test_valid_pagination_unchanged() {
        let plan = compose_search(&SearchParams::new().page(3).limit(50));
        assert_eq!(plan.pagination(), Pagination { page: 3, limit: 50 });
    }

    #[test]
    fn test_empty_filters_match_all() {
        let plan = compose_search(&SearchParams::new().value("").campaign(""));

        assert!(plan.plan.predicates().is_empty());
        assert!(!plan.rows.sql.contains("WHERE"));
        assert_eq!(plan.count.sql, "SELECT COUNT(*) FROM indicators i");
        assert!(plan.params.value.is_none());
    }

    #[test]
    fn test_count_shares_filters() {
        let plan = compose_search(
            &SearchParams::new()
                .indicator_type(IndicatorType::Ip)
                .value("10.0")
                .page(2),
        );

        assert_eq!(plan.count.args, plan.rows.args[..2].to_vec());
        assert_eq!(
            plan.rows.args[2..].to_vec(),
            vec![SqlArg::Integer(20), SqlArg::Integer(20)]
        );
        assert!(!plan.count.sql.contains("ORDER BY"));
        assert!(!plan.count.sql.contains("LIMIT"));
    }

    #[test]
    fn test_supply_order_does_not_matter() {
        let a = compose_search(&SearchParams::new().campaign("c1").value("evil").threat_actor("ta"));
        let b = compose_search(&SearchParams::new().threat_actor("ta").value("evil").campaign("c1"));

        assert_eq!(a, b);
    }

    #[test]
    fn test_to_result_total_pages() {
        let plan = compose_search(&SearchParams::new().limit(20));
        let result = plan.to_result(vec![], 41);

        assert_eq!(result.total_pages, 3);
        assert_eq!(result.page, 1);
        assert_eq!(result.limit, 20);

        let empty = plan.to_result(vec![], 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let plan = compose_search(&SearchParams::new().page(i64::MAX).limit(20));

        assert_eq!(plan.pagination().offset(), i64::MAX);
        assert_eq!(
            plan.rows.args.last(),
            Some(&SqlArg::Integer(i64::MAX))
        );
    }
}
