use common::error::{AppError, Res};
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    dtos::subscription::{CostFilter, SubscriptionFilter},
    models::subscription::Subscription,
};

const SELECT_SUBSCRIPTIONS: &str =
    "SELECT id, user_id, service_name, price, start_date, end_date FROM subscriptions";

pub async fn insert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &Subscription,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (id, user_id, service_name, price, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, service_name, price, start_date, end_date
        "#,
    )
    .bind(data.id)
    .bind(data.user_id)
    .bind(&data.service_name)
    .bind(data.price)
    .bind(data.start_date)
    .bind(data.end_date)
    .fetch_one(executor)
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("subscription with this ID already exists".to_string())
        }
        _ => AppError::from(err),
    })
}

pub async fn get_subscription_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(&format!("{SELECT_SUBSCRIPTIONS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("subscription not found".to_string()))
}

pub async fn get_subscriptions<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: &SubscriptionFilter,
) -> Res<Vec<Subscription>> {
    let mut qb = list_query(filter);
    qb.build_query_as::<Subscription>()
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn update_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &Subscription,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        UPDATE subscriptions
        SET service_name = $1, price = $2, start_date = $3, end_date = $4
        WHERE id = $5
        RETURNING id, user_id, service_name, price, start_date, end_date
        "#,
    )
    .bind(&data.service_name)
    .bind(data.price)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound("subscription to update not found".to_string()))
}

pub async fn delete_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<()> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "subscription to delete not found".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_subscriptions_for_cost<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: &CostFilter,
) -> Res<Vec<Subscription>> {
    let mut qb = cost_query(filter);
    qb.build_query_as::<Subscription>()
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

fn list_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(SELECT_SUBSCRIPTIONS);
    let mut conditions_added = false;

    let mut add_condition_separator = |qb: &mut QueryBuilder<Postgres>| {
        if !conditions_added {
            qb.push(" WHERE ");
            conditions_added = true;
        } else {
            qb.push(" AND ");
        }
    };

    if let Some(user_id) = filter.user_id {
        add_condition_separator(&mut qb);
        qb.push("user_id = ").push_bind(user_id);
    }

    if let Some(service_name) = &filter.service_name {
        add_condition_separator(&mut qb);
        qb.push("service_name = ").push_bind(service_name.clone());
    }

    if let Some(min_price) = filter.min_price {
        add_condition_separator(&mut qb);
        qb.push("price >= ").push_bind(min_price);
    }

    if let Some(max_price) = filter.max_price {
        add_condition_separator(&mut qb);
        qb.push("price <= ").push_bind(max_price);
    }

    if let Some(start_date) = filter.start_date {
        add_condition_separator(&mut qb);
        qb.push("start_date >= ").push_bind(start_date);
    }

    if let Some(end_date) = filter.end_date {
        add_condition_separator(&mut qb);
        qb.push("end_date <= ").push_bind(end_date);
    }

    if let Some(has_end_date) = filter.has_end_date {
        add_condition_separator(&mut qb);
        qb.push(if has_end_date {
            "end_date IS NOT NULL"
        } else {
            "end_date IS NULL"
        });
    }

    qb.push(" ORDER BY start_date DESC, id");
    qb.push(" LIMIT ").push_bind(filter.limit);
    qb.push(" OFFSET ").push_bind(filter.offset);
    qb
}

/// Candidates whose active months can intersect the period:
/// `start_date <= period_end AND (end_date IS NULL OR end_date >= period_start)`.
/// Exact overlap is computed by the caller.
fn cost_query(filter: &CostFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(SELECT_SUBSCRIPTIONS);
    qb.push(" WHERE user_id = ").push_bind(filter.user_id);

    if let Some(service_name) = &filter.service_name {
        qb.push(" AND service_name = ").push_bind(service_name.clone());
    }

    qb.push(" AND start_date <= ").push_bind(filter.period_end);
    qb.push(" AND (end_date IS NULL OR end_date >= ")
        .push_bind(filter.period_start)
        .push(")");
    qb
}

#[cfg(test)]
mod tests {
    use common::month::Month;

    use super::*;

    fn month(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    #[test]
    fn cost_query_selects_every_possible_overlap() {
        let filter = CostFilter {
            user_id: Uuid::new_v4(),
            service_name: None,
            period_start: month(2025, 1),
            period_end: month(2025, 3),
        };
        assert_eq!(
            cost_query(&filter).sql(),
            "SELECT id, user_id, service_name, price, start_date, end_date FROM subscriptions \
             WHERE user_id = $1 AND start_date <= $2 AND (end_date IS NULL OR end_date >= $3)"
        );
    }

    #[test]
    fn cost_query_narrows_by_service_name() {
        let filter = CostFilter {
            user_id: Uuid::new_v4(),
            service_name: Some("Yandex Plus".to_string()),
            period_start: month(2025, 1),
            period_end: month(2025, 3),
        };
        assert_eq!(
            cost_query(&filter).sql(),
            "SELECT id, user_id, service_name, price, start_date, end_date FROM subscriptions \
             WHERE user_id = $1 AND service_name = $2 AND start_date <= $3 \
             AND (end_date IS NULL OR end_date >= $4)"
        );
    }

    #[test]
    fn list_query_without_filters_only_pages() {
        let filter = SubscriptionFilter {
            limit: 10,
            ..Default::default()
        };
        assert_eq!(
            list_query(&filter).sql(),
            "SELECT id, user_id, service_name, price, start_date, end_date FROM subscriptions \
             ORDER BY start_date DESC, id LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn list_query_chains_filters() {
        let filter = SubscriptionFilter {
            user_id: Some(Uuid::new_v4()),
            min_price: Some(100),
            max_price: Some(500),
            has_end_date: Some(false),
            limit: 20,
            offset: 40,
            ..Default::default()
        };
        assert_eq!(
            list_query(&filter).sql(),
            "SELECT id, user_id, service_name, price, start_date, end_date FROM subscriptions \
             WHERE user_id = $1 AND price >= $2 AND price <= $3 AND end_date IS NULL \
             ORDER BY start_date DESC, id LIMIT $4 OFFSET $5"
        );
    }
}
