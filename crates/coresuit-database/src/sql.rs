//! SQL statement construction for the generic repository.
//!
//! Identifiers come from entity column whitelists and are quoted; every
//! value is sent as a typed bind parameter.

use sqlx::{Postgres, QueryBuilder};

use coresuit_core::types::filter::FilterOp;
use coresuit_entity::column::ColumnValue;
use coresuit_entity::query::{Condition, Operand, Query};
use coresuit_entity::traits::Entity;

/// Builder with owned bind arguments.
pub type SqlBuilder = QueryBuilder<'static, Postgres>;

/// Quote an identifier.
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// `SELECT * FROM .. WHERE .. ORDER BY .. LIMIT .. OFFSET ..`
pub fn select<E: Entity>(query: &Query<E>) -> SqlBuilder {
    let mut builder = QueryBuilder::new("SELECT * FROM ");
    builder.push(E::TABLE.qualified_name());
    push_conditions(&mut builder, query.conditions());

    for (i, key) in query.order().iter().enumerate() {
        builder.push(if i == 0 { " ORDER BY " } else { ", " });
        builder.push(quote(key.column.column));
        builder.push(" ");
        builder.push(key.direction.as_sql());
    }
    if let Some(limit) = query.limit() {
        builder.push(" LIMIT ");
        builder.push_bind(limit as i64);
    }
    if let Some(offset) = query.offset() {
        builder.push(" OFFSET ");
        builder.push_bind(offset as i64);
    }
    builder
}

/// `SELECT COUNT(*) FROM .. WHERE ..`
pub fn count<E: Entity>(query: &Query<E>) -> SqlBuilder {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(E::TABLE.qualified_name());
    push_conditions(&mut builder, query.conditions());
    builder
}

/// `SELECT * FROM .. WHERE id = $1`
pub fn select_by_id<E: Entity>(id: i64) -> SqlBuilder {
    let mut builder = QueryBuilder::new("SELECT * FROM ");
    builder.push(E::TABLE.qualified_name());
    builder.push(" WHERE ");
    builder.push(quote(E::ID_COLUMN));
    builder.push(" = ");
    builder.push_bind(id);
    builder
}

/// Multi-row `INSERT .. RETURNING *`. The identity column is left to the
/// database.
pub fn insert<E: Entity>(entities: &[E]) -> SqlBuilder {
    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(E::TABLE.qualified_name());
    builder.push(" (");
    for (i, column) in E::writable_columns().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(quote(column.column));
    }
    builder.push(") VALUES ");

    for (row, entity) in entities.iter().enumerate() {
        builder.push(if row == 0 { "(" } else { ", (" });
        for (i, column) in E::writable_columns().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            let value = entity
                .value(column.column)
                .unwrap_or_else(|| ColumnValue::null(column.kind));
            push_value(&mut builder, value);
        }
        builder.push(")");
    }
    builder.push(" RETURNING *");
    builder
}

/// Full-row `UPDATE .. SET .. WHERE id = $n RETURNING *`.
pub fn update<E: Entity>(entity: &E) -> SqlBuilder {
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(E::TABLE.qualified_name());
    builder.push(" SET ");
    for (i, column) in E::writable_columns().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(quote(column.column));
        builder.push(" = ");
        let value = entity
            .value(column.column)
            .unwrap_or_else(|| ColumnValue::null(column.kind));
        push_value(&mut builder, value);
    }
    builder.push(" WHERE ");
    builder.push(quote(E::ID_COLUMN));
    builder.push(" = ");
    builder.push_bind(entity.id());
    builder.push(" RETURNING *");
    builder
}

fn push_conditions(builder: &mut SqlBuilder, conditions: &[Condition]) {
    for (i, condition) in conditions.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_condition(builder, condition);
    }
}

fn push_condition(builder: &mut SqlBuilder, condition: &Condition) {
    let column = quote(condition.column.column);
    match (&condition.op, &condition.operand) {
        (FilterOp::IsNull | FilterOp::IsNotNull, _) => {
            builder.push(column);
            builder.push(" ");
            builder.push(condition.op.as_sql());
        }
        (FilterOp::In, Operand::List(values)) if values.is_empty() => {
            builder.push("FALSE");
        }
        (FilterOp::In, Operand::List(values)) => {
            builder.push(column);
            builder.push(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                push_value(builder, value.clone());
            }
            builder.push(")");
        }
        (op, Operand::Value(value)) => {
            builder.push(column);
            builder.push(" ");
            builder.push(op.as_sql());
            builder.push(" ");
            push_value(builder, value.clone());
        }
        // Resolution never pairs a binary operator with a missing operand.
        _ => {
            builder.push("FALSE");
        }
    }
}

fn push_value(builder: &mut SqlBuilder, value: ColumnValue) {
    match value {
        ColumnValue::Int(v) => builder.push_bind(v),
        ColumnValue::Text(v) => builder.push_bind(v),
        ColumnValue::Bool(v) => builder.push_bind(v),
        ColumnValue::Float(v) => builder.push_bind(v),
        ColumnValue::Timestamp(v) => builder.push_bind(v),
    };
}
