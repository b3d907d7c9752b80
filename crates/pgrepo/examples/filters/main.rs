//! Compose and compile filters without touching a database.
//!
//! Run with: `cargo run --example filters`

use pgrepo::{clause, ident, ClauseBuilder, RepoResult};

fn main() -> RepoResult<()> {
    let entries = ClauseBuilder::new()
        .eq("status", "active")
        .and()
        .gte("age", 18)
        .or()
        .in_list("role", ["admin", "owner"])
        .between("createdAt", "2026-01-01", "2026-12-31")
        .build();

    let compiled = clause::compile(&entries, ident::snake_case)?
        .expect("at least one condition was provided");
    println!("template: {}", compiled.sql);

    let (sql, args) = pgrepo::sql::expand(&compiled.sql, &compiled.args)?;
    println!("postgres: WHERE {sql}");
    println!("binds:    {args:?}");

    // Degenerate sequences compile to "no WHERE clause", not an error.
    let none = clause::compile(&ClauseBuilder::new().or().and().build(), ident::snake_case)?;
    assert!(none.is_none());

    Ok(())
}
