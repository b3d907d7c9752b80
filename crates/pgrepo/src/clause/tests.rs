use super::*;

fn compiled(entries: &[ClauseEntry]) -> CompiledWhere {
    compile(entries, ident::snake_case)
        .expect("compile should succeed")
        .expect("clause should be non-empty")
}

#[test]
fn empty_sequence_compiles_to_none() {
    let result = compile(&[], ident::snake_case).unwrap();
    assert!(result.is_none());
}

#[test]
fn single_condition() {
    let entries = ClauseBuilder::new().eq("status", "active").build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "status = ?");
    assert_eq!(w.args, vec![Value::Text("active".to_string())]);
}

#[test]
fn missing_connector_implies_and() {
    let entries = ClauseBuilder::new()
        .eq("a", 1)
        .eq("b", 2)
        .eq("c", 3)
        .build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "a = ? AND b = ? AND c = ?");
    assert_eq!(w.args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn order_is_preserved_in_sql_and_args() {
    let entries = ClauseBuilder::new()
        .gte("age", 18)
        .eq("status", "active")
        .lt("logins", 100)
        .build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "age >= ? AND status = ? AND logins < ?");
    assert_eq!(
        w.args,
        vec![
            Value::Int(18),
            Value::Text("active".to_string()),
            Value::Int(100)
        ]
    );
}

#[test]
fn or_affects_only_the_next_join() {
    let entries = ClauseBuilder::new()
        .eq("a", 1)
        .or()
        .eq("b", 2)
        .eq("c", 3)
        .build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "a = ? OR b = ? AND c = ?");
    assert_eq!(w.args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn explicit_and_matches_implicit() {
    let explicit = ClauseBuilder::new().eq("a", 1).and().eq("b", 2).build();
    let implicit = ClauseBuilder::new().eq("a", 1).eq("b", 2).build();
    assert_eq!(compiled(&explicit).sql, compiled(&implicit).sql);
}

#[test]
fn leading_connector_is_dropped() {
    let with_marker = ClauseBuilder::new().or().eq("a", 1).build();
    let without = ClauseBuilder::new().eq("a", 1).build();
    assert_eq!(compiled(&with_marker).sql, compiled(&without).sql);
    assert_eq!(compiled(&with_marker).args, compiled(&without).args);
}

#[test]
fn connector_only_sequence_compiles_to_none() {
    let entries = ClauseBuilder::new().or().and().or().build();
    assert!(compile(&entries, ident::snake_case).unwrap().is_none());
}

#[test]
fn repeated_connectors_last_one_wins() {
    let entries = ClauseBuilder::new()
        .eq("a", 1)
        .and()
        .or()
        .eq("b", 2)
        .build();
    assert_eq!(compiled(&entries).sql, "a = ? OR b = ?");
}

#[test]
fn trailing_connector_is_harmless() {
    let entries = ClauseBuilder::new().eq("a", 1).or().build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "a = ?");
}

#[test]
fn between_contributes_two_args_in_order() {
    let entries = ClauseBuilder::new()
        .eq("status", "active")
        .between("age", 18, 65)
        .eq("city", "rome")
        .build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "status = ? AND age BETWEEN ? AND ? AND city = ?");
    assert_eq!(
        w.args,
        vec![
            Value::Text("active".to_string()),
            Value::Int(18),
            Value::Int(65),
            Value::Text("rome".to_string())
        ]
    );
}

#[test]
fn in_list_keeps_one_list_arg_even_when_empty() {
    let entries = ClauseBuilder::new()
        .in_list("role", Vec::<String>::new())
        .build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "role IN (?)");
    assert_eq!(w.args, vec![Value::List(Vec::new())]);
}

#[test]
fn builder_matches_literal_sequence() {
    let built = ClauseBuilder::new()
        .eq("status", "active")
        .and()
        .gte("age", 18)
        .or()
        .in_list("role", ["admin", "owner"])
        .build();

    let literal = vec![
        ClauseEntry::cond("status", Condition::eq("active")),
        ClauseEntry::Connector(Connector::And),
        ClauseEntry::cond("age", Condition::gte(18)),
        ClauseEntry::Connector(Connector::Or),
        ClauseEntry::cond("role", Condition::in_list(["admin", "owner"])),
    ];

    let a = compiled(&built);
    let b = compiled(&literal);
    assert_eq!(a.sql, "status = ? AND age >= ? OR role IN (?)");
    assert_eq!(a.sql, b.sql);
    assert_eq!(a.args, b.args);
    assert_eq!(
        a.args,
        vec![
            Value::Text("active".to_string()),
            Value::Int(18),
            Value::List(vec![
                Value::Text("admin".to_string()),
                Value::Text("owner".to_string())
            ])
        ]
    );
}

#[test]
fn multi_pair_predicate_joins_locally_with_and() {
    let entries = vec![
        ClauseEntry::predicate(vec![
            ("a".to_string(), Condition::eq(1)),
            ("b".to_string(), Condition::gt(2)),
        ]),
        ClauseEntry::Connector(Connector::Or),
        ClauseEntry::cond("c", Condition::eq(3)),
    ];
    let w = compiled(&entries);
    assert_eq!(w.sql, "a = ? AND b > ? OR c = ?");
    assert_eq!(w.args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn empty_predicate_entries_are_skipped() {
    let entries = vec![
        ClauseEntry::predicate(Vec::new()),
        ClauseEntry::cond("a", Condition::eq(1)),
        ClauseEntry::predicate(Vec::new()),
        ClauseEntry::cond("b", Condition::eq(2)),
    ];
    assert_eq!(compiled(&entries).sql, "a = ? AND b = ?");
}

#[test]
fn normalizer_is_applied_before_the_safety_check() {
    let entries = ClauseBuilder::new().eq("createdBy", "alice").build();
    let w = compiled(&entries);
    assert_eq!(w.sql, "created_by = ?");
}

#[test]
fn unsafe_identifier_rejects_whole_compile() {
    let entries = ClauseBuilder::new()
        .eq("status", "active")
        .eq("name; DROP TABLE users", "x")
        .build();
    let err = compile(&entries, ident::verbatim).unwrap_err();
    assert!(matches!(err, RepoError::UnsafeIdentifier(_)));
}

#[test]
fn unsafe_identifier_rejects_double_qualifier() {
    let entries = ClauseBuilder::new().eq("a.b.c", 1).build();
    let err = compile(&entries, ident::verbatim).unwrap_err();
    assert!(matches!(err, RepoError::UnsafeIdentifier(_)));
}

#[test]
fn qualified_column_passes() {
    let entries = ClauseBuilder::new().eq("users.status", "active").build();
    assert_eq!(compiled(&entries).sql, "users.status = ?");
}

#[test]
fn build_is_an_idempotent_frozen_snapshot() {
    let mut builder = ClauseBuilder::new();
    builder.eq("a", 1);
    let first = builder.build();
    let again = builder.build();
    assert_eq!(first.len(), again.len());

    builder.eq("b", 2);
    // The earlier snapshot must not grow.
    assert_eq!(first.len(), 1);
    assert_eq!(builder.build().len(), 2);
}

#[test]
fn legacy_map_mode_joins_all_pairs_with_and() {
    let mut map = HashMap::new();
    map.insert("status".to_string(), Condition::eq("active"));
    map.insert("age".to_string(), Condition::gte(18));
    let entries = vec![ClauseEntry::from_map(map)];

    let w = compiled(&entries);
    // Join order among map columns is implementation-defined; both args and
    // fragments must still pair up.
    assert!(w.sql == "status = ? AND age >= ?" || w.sql == "age >= ? AND status = ?");
    assert_eq!(w.args.len(), 2);
    if w.sql.starts_with("status") {
        assert_eq!(w.args[0], Value::Text("active".to_string()));
    } else {
        assert_eq!(w.args[0], Value::Int(18));
    }
}

#[test]
fn legacy_map_reserved_keys_become_connectors() {
    let mut and_map = HashMap::new();
    and_map.insert(AND_KEY.to_string(), Condition::eq(0));
    assert!(matches!(
        ClauseEntry::from_map(and_map),
        ClauseEntry::Connector(Connector::And)
    ));

    let mut or_map = HashMap::new();
    or_map.insert(OR_KEY.to_string(), Condition::eq(0));
    assert!(matches!(
        ClauseEntry::from_map(or_map),
        ClauseEntry::Connector(Connector::Or)
    ));
}

#[test]
fn reserved_keys_fail_the_identifier_check() {
    assert!(!ident::is_safe_identifier(AND_KEY));
    assert!(!ident::is_safe_identifier(OR_KEY));
}

#[test]
fn rejection_happens_even_after_valid_entries() {
    // Entry order matters: a malformed name reached mid-sequence still
    // rejects, and no partial SQL escapes.
    let entries = vec![
        ClauseEntry::cond("good", Condition::eq(1)),
        ClauseEntry::Connector(Connector::Or),
        ClauseEntry::cond("bad name", Condition::eq(2)),
    ];
    assert!(compile(&entries, ident::verbatim).is_err());
}
