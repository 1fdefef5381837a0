use indexmap::IndexMap;
use serde::Serialize;
use sqlparser::ast::{ObjectName, ObjectNamePart, Query, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

/// The parts of a mapping query the adapter needs to route events: every table it reads from,
/// keyed by the alias the query uses for it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SchemaItem {
    pub alias_tables: IndexMap<String, TableItem>,
}

impl SchemaItem {
    pub fn tables(&self) -> impl Iterator<Item = &TableItem> {
        self.alias_tables.values()
    }

    /// Fails on an alias that is already taken.
    fn add(&mut self, item: TableItem) -> Result<(), String> {
        if self.alias_tables.contains_key(&item.alias) {
            return Err(format!("table alias {} is used twice in mapping sql", item.alias));
        }
        self.alias_tables.insert(item.alias.clone(), item);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableItem {
    pub schema: Option<String>,
    pub table_name: String,
    pub alias: String,
}

pub struct SqlParser;

impl SqlParser {
    /// Extracts the aliased tables of a `select` mapping query.
    pub fn parse(sql: &str) -> Result<SchemaItem, String> {
        let dialect = MySqlDialect {};
        let statements = Parser::parse_sql(&dialect, sql).map_err(|err| err.to_string())?;

        let query = match statements.as_slice() {
            [Statement::Query(query)] => query,
            [_] => return Err("mapping sql must be a select query".to_string()),
            _ => return Err("mapping sql must contain exactly one statement".to_string()),
        };

        let mut item = SchemaItem::default();
        collect_query(query, &mut item)?;

        if item.alias_tables.is_empty() {
            return Err("mapping sql does not read from any table".to_string());
        }
        Ok(item)
    }
}

fn collect_query(query: &Query, item: &mut SchemaItem) -> Result<(), String> {
    match query.body.as_ref() {
        SetExpr::Select(select) => {
            for from in &select.from {
                collect_from(from, item)?;
            }
            Ok(())
        }
        SetExpr::Query(inner) => collect_query(inner, item),
        _ => Err("mapping sql must be a plain select, set operations are not supported".to_string()),
    }
}

fn collect_from(from: &TableWithJoins, item: &mut SchemaItem) -> Result<(), String> {
    collect_factor(&from.relation, item)?;
    for join in &from.joins {
        collect_factor(&join.relation, item)?;
    }
    Ok(())
}

fn collect_factor(factor: &TableFactor, item: &mut SchemaItem) -> Result<(), String> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let mut parts = name_parts(name)?;
            let table_name = parts.pop().ok_or("empty table name")?;
            let schema = parts.pop();
            let alias = alias
                .as_ref()
                .map(|a| a.name.value.clone())
                .unwrap_or_else(|| table_name.clone());
            item.add(TableItem {
                schema,
                table_name,
                alias,
            })
        }
        TableFactor::Derived {
            subquery, alias, ..
        } => {
            let mut inner = SchemaItem::default();
            collect_query(subquery, &mut inner)?;
            match (alias, inner.alias_tables.len()) {
                // a single-table subquery is addressed by its outer alias
                (Some(alias), 1) => {
                    if let Some((_, mut table)) = inner.alias_tables.pop() {
                        table.alias = alias.name.value.clone();
                        item.add(table)?;
                    }
                }
                // inner aliases live in their own scope, qualify them with the outer one
                (Some(alias), _) => {
                    for mut table in inner.alias_tables.into_values() {
                        table.alias = format!("{}.{}", alias.name.value, table.alias);
                        item.add(table)?;
                    }
                }
                (None, _) => {
                    for table in inner.alias_tables.into_values() {
                        item.add(table)?;
                    }
                }
            }
            Ok(())
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => collect_from(table_with_joins, item),
        other => Err(format!("unsupported table expression in mapping sql: {}", other)),
    }
}

fn name_parts(name: &ObjectName) -> Result<Vec<String>, String> {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => Ok(ident.value.clone()),
            other => Err(format!("unsupported table name in mapping sql: {}", other)),
        })
        .collect()
}
