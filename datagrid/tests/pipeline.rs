use datagrid::DataGrid;
use datagrid::GridConfig;
use datagrid::GridEvent;
use datagrid::Interaction;
use datagrid::filter::FilterSpec;
use datagrid::filter::Predicate;
use datagrid::group::AggregateFn;
use datagrid::group::CollapseState;
use datagrid::group::GridItem;
use datagrid::group::GroupKey;
use datagrid::group::GroupOrder;
use datagrid::group::GroupSpec;
use datagrid::model::Column;
use datagrid::model::ColumnType;
use datagrid::model::Record;
use datagrid::model::RowId;
use datagrid::model::Value;
use datagrid::page::PageRequest;
use datagrid::recompute;
use datagrid::selection::Selection;
use datagrid::selection::TriState;
use datagrid::sort::SortSpec;
use datagrid::store::RowStore;

fn team() -> RowStore {
    let columns = vec![
        Column::new("name", ColumnType::String).sortable().filterable(),
        Column::new("role", ColumnType::String)
            .groupable()
            .filterable()
            .sortable(),
        Column::new("hours", ColumnType::Number)
            .sortable()
            .filterable()
            .aggregate(AggregateFn::Sum),
    ];
    let rows = vec![
        Record::new(1usize).set("name", "Mara").set("role", "admin").set("hours", 10),
        Record::new(2usize).set("name", "Jon").set("role", "user").set("hours", 20),
        Record::new(3usize).set("name", "Ines").set("role", "editor").set("hours", "x"),
        Record::new(4usize).set("name", "Otto").set("role", "user").set("hours", 40),
        Record::new(5usize).set("name", "Bea").set("role", "admin"),
    ];
    RowStore::new(columns, rows).unwrap()
}

fn ids(raw: &[&str]) -> Vec<RowId> {
    raw.iter().map(|&s| RowId::from(s)).collect()
}

#[test]
fn test_roles_group_in_first_seen_order() {
    let store = team();
    let view = recompute(
        &store,
        &FilterSpec::new(),
        &SortSpec::new(),
        &GroupSpec::by("role"),
        &PageRequest::first(50),
        &Selection::new(),
        &CollapseState::new(),
    )
    .unwrap();

    let summary: Vec<(String, usize)> = view
        .groups
        .iter()
        .map(|g| (g.key.to_string(), g.len()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("admin".to_string(), 2),
            ("user".to_string(), 2),
            ("editor".to_string(), 1),
        ]
    );
    // 3 headers + 5 rows
    assert_eq!(view.grouped_sequence().len(), 8);
}

#[test]
fn test_sort_toggle_reverses_exactly() {
    let mut grid = DataGrid::new(team(), GridConfig::default()).unwrap();
    let click = || Interaction::SortClick {
        column: "name".into(),
    };

    grid.dispatch(click()).unwrap();
    let asc = grid.view().sorted_row_ids().to_vec();
    assert_eq!(asc, ids(&["5", "3", "2", "1", "4"]));

    grid.dispatch(click()).unwrap();
    let mut desc = grid.view().sorted_row_ids().to_vec();
    desc.reverse();
    assert_eq!(desc, asc);

    // Third click clears the sort and restores snapshot order
    grid.dispatch(click()).unwrap();
    assert_eq!(
        grid.view().sorted_row_ids(),
        &ids(&["1", "2", "3", "4", "5"])[..]
    );
}

#[test]
fn test_groups_follow_sorted_order() {
    let store = team();
    let view = recompute(
        &store,
        &FilterSpec::new(),
        &SortSpec::asc("name"),
        &GroupSpec::by("role"),
        &PageRequest::first(50),
        &Selection::new(),
        &CollapseState::new(),
    )
    .unwrap();

    let keys: Vec<String> = view.groups.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(keys, vec!["admin", "editor", "user"]);
    assert_eq!(view.groups[0].rows, ids(&["5", "1"]));
    assert_eq!(view.groups[2].rows, ids(&["2", "4"]));
}

#[test]
fn test_aggregates_on_numeric_fixture() {
    let store = team();
    let spec = GroupSpec::new()
        .then_by("role")
        .with_order(GroupOrder::KeyAscending)
        .count("hours", "rows")
        .sum("hours", "total")
        .avg("hours", "mean")
        .min("hours", "least")
        .max("hours", "most")
        .distinct("hours", "kinds");
    let view = recompute(
        &store,
        &FilterSpec::new(),
        &SortSpec::new(),
        &spec,
        &PageRequest::first(50),
        &Selection::new(),
        &CollapseState::new(),
    )
    .unwrap();

    let admin = &view.groups[0];
    assert_eq!(admin.key, GroupKey::new(["admin"]));
    assert_eq!(admin.aggregate("rows"), Some(&Value::Int(2)));
    assert_eq!(admin.aggregate("total"), Some(&Value::Int(10)));
    assert_eq!(admin.aggregate("mean"), Some(&Value::Float(10.0)));
    assert_eq!(admin.aggregate("least"), Some(&Value::Int(10)));

    // Non-numeric hours are skipped but the row still counts
    let editor = &view.groups[1];
    assert_eq!(editor.aggregate("rows"), Some(&Value::Int(1)));
    assert_eq!(editor.aggregate("total"), Some(&Value::Int(0)));
    assert_eq!(editor.aggregate("mean"), Some(&Value::Null));
    assert_eq!(editor.aggregate("most"), Some(&Value::Null));

    let user = &view.groups[2];
    assert_eq!(user.aggregate("total"), Some(&Value::Int(60)));
    assert_eq!(user.aggregate("mean"), Some(&Value::Float(30.0)));
    assert_eq!(user.aggregate("least"), Some(&Value::Int(20)));
    assert_eq!(user.aggregate("most"), Some(&Value::Int(40)));
    assert_eq!(user.aggregate("kinds"), Some(&Value::Int(2)));
}

#[test]
fn test_collapse_survives_recompute() {
    let mut grid = DataGrid::new(team(), GridConfig::default()).unwrap();
    grid.set_group(GroupSpec::by("role")).unwrap();
    let key = GroupKey::new(["user"]);
    let events = grid
        .dispatch(Interaction::GroupCollapseToggle { key: key.clone() })
        .unwrap();
    assert_eq!(
        events,
        vec![GridEvent::GroupToggled {
            key: key.clone(),
            collapsed: true,
        }]
    );

    grid.dispatch(Interaction::SortClick {
        column: "hours".into(),
    })
    .unwrap();
    let visible_rows: Vec<&RowId> = grid
        .view()
        .grouped_sequence()
        .iter()
        .filter_map(GridItem::row_id)
        .collect();
    assert_eq!(visible_rows.len(), 3);
    assert!(grid.collapse().is_collapsed(&key));
}

#[test]
fn test_filter_and_selection_interplay() {
    let mut grid = DataGrid::new(team(), GridConfig::default()).unwrap();
    grid.set_filter(FilterSpec::new().and("role", Predicate::eq("user")))
        .unwrap();
    assert_eq!(grid.view().filtered_count(), 2);

    grid.dispatch(Interaction::SelectAllToggle).unwrap();
    assert_eq!(grid.selection().selected(), ids(&["2", "4"]));

    // Widening the filter turns "all" into "partial"
    grid.set_filter(FilterSpec::new()).unwrap();
    assert_eq!(grid.view().selection.tri_state, TriState::Partial);

    let names: Vec<&Value> = grid
        .selected_rows()
        .into_iter()
        .filter_map(|r| r.get("name"))
        .collect();
    assert_eq!(names, vec![&Value::from("Jon"), &Value::from("Otto")]);
}

#[test]
fn test_range_select_follows_display_order() {
    let mut grid = DataGrid::new(team(), GridConfig::default()).unwrap();
    grid.set_sort(SortSpec::asc("name")).unwrap();
    grid.dispatch(Interaction::RowSelectToggle { id: RowId::from("3") })
        .unwrap();
    grid.dispatch(Interaction::RowRangeSelect {
        id: RowId::from("1"),
        extend: false,
    })
    .unwrap();
    // Display order is Bea(5), Ines(3), Jon(2), Mara(1), Otto(4)
    assert_eq!(grid.selection().selected(), ids(&["1", "2", "3"]));
}
