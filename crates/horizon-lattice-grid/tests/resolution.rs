//! Integration tests for row and cell attribute resolution.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_lattice_grid::prelude::*;
use parking_lot::Mutex;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn orders(count: usize) -> Arc<dyn GridSource> {
    Arc::new(
        (0..count)
            .map(|i| {
                vec![
                    CellValue::from(format!("order {i}")),
                    CellValue::from(i as i64 * 10),
                    CellValue::from(i % 2 == 0),
                ]
            })
            .collect::<Vec<_>>(),
    )
}

fn order_columns() -> ColumnSet {
    ColumnSet::new()
        .with_column(ColumnSpec::new("name"))
        .with_column(ColumnSpec::new("amount").with_kind(ColumnKind::Number))
        .with_column(ColumnSpec::new("shipped").with_kind(ColumnKind::CheckBox))
}

fn resolver(count: usize) -> AttributeResolver {
    setup();
    AttributeResolver::new(orders(count), order_columns(), GridConfig::default())
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_requery_yields_identical_contexts() {
    let resolver = resolver(5)
        .with_row_callback(|row| {
            if row.row() % 2 == 0 {
                row.add_warning("Even order", "amount");
                row.set_color_category(ColorCategory::Subtotal1);
            }
            Ok(())
        })
        .with_cell_callback(|cell| {
            if cell.column() == 1 {
                let text = cell.original_value().display_text().unwrap_or_default();
                let formatted = format!("${text}");
                cell.set_formatted_value(formatted);
            }
            Ok(())
        });

    for reason in [QueryReason::Display, QueryReason::Print, QueryReason::Tooltip] {
        let first_row = resolver.row_info(2, reason).unwrap();
        let first_cell = resolver.cell_info(1).unwrap();

        resolver.row_info(3, reason).unwrap();
        resolver.cell_info(0).unwrap();

        let second_row = resolver.row_info(2, reason).unwrap();
        let second_cell = resolver.cell_info(1).unwrap();
        assert_eq!(first_row, second_row);
        assert_eq!(first_cell, second_cell);
    }
}

// ============================================================================
// Severity escalation
// ============================================================================

#[test]
fn test_severity_is_maximum_regardless_of_order() {
    type Add = fn(&mut RowAttributeContext);
    fn info(row: &mut RowAttributeContext) {
        row.add_info("a", "");
    }
    fn error(row: &mut RowAttributeContext) {
        row.add_error("b", "");
    }
    fn warning(row: &mut RowAttributeContext) {
        row.add_warning("c", "");
    }
    let calls: [(Add, SeverityKind); 3] = [
        (info, SeverityKind::Info),
        (error, SeverityKind::Error),
        (warning, SeverityKind::Warning),
    ];
    let permutations = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for order in permutations {
        for len in 1..=3 {
            let chosen: Vec<_> = order[..len].iter().map(|&i| calls[i]).collect();
            let expected = chosen
                .iter()
                .map(|(_, severity)| *severity)
                .max()
                .unwrap();
            let adds: Vec<Add> = chosen.iter().map(|(add, _)| *add).collect();

            let resolver = resolver(1).with_row_callback(move |row| {
                for add in &adds {
                    add(row);
                }
                Ok(())
            });
            let row = resolver.row_info(0, QueryReason::Display).unwrap();
            assert_eq!(row.severity(), expected, "order {order:?} len {len}");
        }
    }
}

// ============================================================================
// Borders
// ============================================================================

#[test]
fn test_total_row_sets_thick_borders_on_rows_only() {
    let resolver = resolver(3)
        .with_row_callback(|row| {
            match row.row() {
                0 => row.set_color_category(ColorCategory::TotalRow),
                1 => row.set_color_category_only(ColorCategory::TotalRow),
                _ => {}
            }
            Ok(())
        })
        .with_cell_callback(|cell| {
            if cell.row() == 2 {
                cell.set_color_category(ColorCategory::TotalRow);
            }
            Ok(())
        });

    let total = resolver.row_info(0, QueryReason::Display).unwrap();
    assert_eq!(total.borders().top, BorderStyle::Thick);
    assert_eq!(total.borders().bottom, BorderStyle::Thick);

    let category_only = resolver.row_info(1, QueryReason::Display).unwrap();
    assert_eq!(category_only.color_category(), ColorCategory::TotalRow);
    assert_eq!(*category_only.borders(), Borders::default());

    resolver.row_info(2, QueryReason::Display).unwrap();
    let cell = resolver.cell_info(0).unwrap();
    assert_eq!(cell.color_category(), ColorCategory::TotalRow);
    assert_eq!(cell.borders().top, BorderStyle::Default);
    assert_eq!(cell.borders().bottom, BorderStyle::Default);
}

#[test]
fn test_cell_borders_inherit_from_row_and_column() {
    let columns = ColumnSet::new()
        .with_column(ColumnSpec::new("name"))
        .with_column(
            ColumnSpec::new("amount").with_side_borders(BorderStyle::Thick, BorderStyle::Default),
        );
    let resolver = AttributeResolver::new(orders(1), columns, GridConfig::default())
        .with_row_callback(|row| {
            row.set_left_border(BorderStyle::Default);
            row.set_top_border(BorderStyle::Thick);
            row.set_right_border(BorderStyle::Thin);
            row.set_bottom_border(BorderStyle::Default);
            Ok(())
        });

    resolver.row_info(0, QueryReason::Print).unwrap();
    let cell = resolver.cell_info(1).unwrap();
    let borders = cell.borders();
    assert_eq!(borders.left, BorderStyle::Thick);
    assert_eq!(borders.top, BorderStyle::Thick);
    assert_eq!(borders.right, BorderStyle::Thin);
    assert_eq!(borders.bottom, BorderStyle::Default);
}

// ============================================================================
// Color escalation
// ============================================================================

#[test]
fn test_cell_color_never_below_row_or_column() {
    for row_category in ColorCategory::ALL {
        for minimum in ColorCategory::ALL {
            let columns = ColumnSet::new().with_column(
                ColumnSpec::new("value").with_minimum_category(minimum),
            );
            let resolver = AttributeResolver::new(orders(1), columns, GridConfig::default())
                .with_row_callback(move |row| {
                    row.set_color_category_only(row_category);
                    Ok(())
                });

            resolver.row_info(0, QueryReason::Display).unwrap();
            let cell = resolver.cell_info(0).unwrap();
            assert!(
                cell.color_category() >= row_category.max(minimum),
                "row {row_category:?} minimum {minimum:?}"
            );
        }
    }
}

#[test]
fn test_message_severity_overrides_column_minimum_but_not_row_error() {
    let columns = ColumnSet::new()
        .with_column(ColumnSpec::new("qty").with_minimum_category(ColorCategory::Subtotal1))
        .with_column(ColumnSpec::new("price").with_minimum_category(ColorCategory::Subtotal2));
    let source: Arc<dyn GridSource> = Arc::new(vec![vec![CellValue::Null; 2]; 2]);
    let resolver = AttributeResolver::new(source, columns, GridConfig::default())
        .with_row_callback(|row| {
            if row.row() == 1 {
                row.set_color_category_only(ColorCategory::Error);
            }
            row.add_warning("Check quantity", "qty");
            row.add_error("Price missing", "price");
            Ok(())
        });

    resolver.row_info(0, QueryReason::Display).unwrap();
    assert_eq!(resolver.cell_info(0).unwrap().color_category(), ColorCategory::Warning);
    assert_eq!(resolver.cell_info(1).unwrap().color_category(), ColorCategory::Error);

    resolver.row_info(1, QueryReason::Display).unwrap();
    assert_eq!(resolver.cell_info(0).unwrap().color_category(), ColorCategory::Error);
}

// ============================================================================
// Values and tooltips
// ============================================================================

#[test]
fn test_formatted_value_selection() {
    let source: Arc<dyn GridSource> = Arc::new(vec![vec![
        CellValue::from("Z"),
        CellValue::Null,
        CellValue::from("raw"),
    ]]);
    let resolver = AttributeResolver::new(source, order_columns(), GridConfig::default())
        .with_cell_callback(|cell| {
            match cell.column() {
                0 => cell.set_value("ignored"),
                1 => cell.set_value("Y"),
                _ => cell.set_formatted_value("X"),
            }
            Ok(())
        });

    resolver.row_info(0, QueryReason::Display).unwrap();
    assert_eq!(resolver.cell_info(0).unwrap().formatted_value(), &CellValue::from("Z"));
    assert_eq!(resolver.cell_info(1).unwrap().formatted_value(), &CellValue::from("Y"));
    assert_eq!(resolver.cell_info(2).unwrap().formatted_value(), &CellValue::from("X"));
}

#[test]
fn test_messages_compose_tooltip_only_for_display() {
    let resolver = resolver(1).with_row_callback(|row| {
        row.add_info("M1", "");
        row.add_warning("M2", "");
        Ok(())
    });

    let display = resolver.row_info(0, QueryReason::Display).unwrap();
    assert_eq!(display.tooltip_text(), "M1\nM2");

    let print = resolver.row_info(0, QueryReason::Print).unwrap();
    assert_eq!(print.tooltip_text(), "");
    assert_eq!(print.severity(), SeverityKind::Warning);
}

#[test]
fn test_cell_tooltip_seeding() {
    let resolver = resolver(2).with_row_callback(|row| {
        if row.row() == 0 {
            row.add_error("Amount exceeds limit", "amount");
        }
        Ok(())
    });

    assert_eq!(resolver.cell_tooltip(0, 1).unwrap(), "Amount exceeds limit");
    assert_eq!(resolver.cell_tooltip(1, 0).unwrap(), "order 1");
    assert_eq!(resolver.cell_tooltip(1, 1).unwrap(), "10");
    assert_eq!(resolver.row_tooltip(0).unwrap(), "Amount exceeds limit");
}

#[test]
fn test_hidden_content_suppresses_tooltip_unless_explicit() {
    let resolver = resolver(2)
        .with_row_callback(|row| {
            row.set_content_visible(false);
            Ok(())
        })
        .with_cell_callback(|cell| {
            if cell.row() == 1 {
                cell.set_tooltip_text("Not shipped yet");
            }
            Ok(())
        });

    resolver.row_info(0, QueryReason::Display).unwrap();
    assert!(resolver.cell_info(0).unwrap().content_visible());
    assert!(!resolver.cell_info(2).unwrap().content_visible());

    assert_eq!(resolver.cell_tooltip(0, 2).unwrap(), "");
    assert_eq!(resolver.cell_tooltip(1, 2).unwrap(), "Not shipped yet");
}

#[test]
fn test_template_style_is_copied_on_write() {
    let columns = ColumnSet::new().with_column(
        ColumnSpec::new("amount")
            .with_style(CellStyle::aligned(HorizontalAlignment::Right), true),
    );
    let resolver = AttributeResolver::new(orders(2), columns, GridConfig::default())
        .with_cell_callback(|cell| {
            if cell.row() == 0 {
                cell.style_mut().alignment = HorizontalAlignment::Center;
            }
            Ok(())
        });

    resolver.row_info(0, QueryReason::Display).unwrap();
    let changed = resolver.cell_info(0).unwrap();
    assert_eq!(changed.style().alignment, HorizontalAlignment::Center);
    assert!(!changed.style_is_template());

    resolver.row_info(1, QueryReason::Display).unwrap();
    let untouched = resolver.cell_info(0).unwrap();
    assert_eq!(untouched.style().alignment, HorizontalAlignment::Right);
    assert!(untouched.style_is_template());
    assert_eq!(
        resolver.columns().get(0).unwrap().style().alignment,
        HorizontalAlignment::Right
    );
}

// ============================================================================
// Read-only
// ============================================================================

#[test]
fn test_read_only_sources() {
    let columns = order_columns().with_column(
        ColumnSpec::new("id").with_read_only(true, Some("Ids are assigned".to_string())),
    );
    let source: Arc<dyn GridSource> = Arc::new(vec![vec![CellValue::Null; 4]; 2]);
    let resolver = AttributeResolver::new(source, columns, GridConfig::default())
        .with_row_callback(|row| {
            if row.row() == 1 {
                row.set_read_only(true);
            }
            Ok(())
        });

    assert_eq!(
        resolver.cell_read_only(0, 3).unwrap(),
        (true, "Ids are assigned".to_string())
    );
    let (read_only, _) = resolver.cell_read_only(0, 0).unwrap();
    assert!(!read_only);
    assert_eq!(
        resolver.cell_read_only(1, 3).unwrap(),
        (true, "This cell is read-only.".to_string())
    );
}

#[test]
fn test_read_only_view_answers_without_callbacks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let config = GridConfig::default()
        .with_read_only(true)
        .with_view_read_only_message("Locked");
    let resolver = AttributeResolver::new(orders(2), order_columns(), config)
        .with_cell_callback(move |_cell| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

    assert_eq!(resolver.cell_read_only(1, 1).unwrap(), (true, "Locked".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(resolver.phase(), ResolvePhase::Idle);
}

// ============================================================================
// Messages
// ============================================================================

#[test]
fn test_unknown_column_names_are_ignored() {
    let resolver = resolver(1).with_row_callback(|row| {
        row.add_error("Bad", "missing, amount ,also_missing");
        Ok(())
    });

    let row = resolver.row_info(0, QueryReason::Display).unwrap();
    assert_eq!(row.messages().row_messages().len(), 1);
    assert_eq!(row.messages().messages_for(1).len(), 1);
    assert!(row.messages().messages_for(0).is_empty());
    assert_eq!(resolver.cell_info(1).unwrap().severity(), SeverityKind::Error);
    assert_eq!(resolver.cell_info(0).unwrap().severity(), SeverityKind::None);
}

#[test]
fn test_message_collection_with_fallback_and_row_ids() {
    let config = GridConfig::default().with_no_message_text("Needs review");
    let resolver = AttributeResolver::new(orders(3), order_columns(), config).with_row_callback(
        |row| {
            match row.row() {
                0 => row.add_error("Missing customer", "name"),
                1 => {
                    row.escalate_severity(SeverityKind::Warning);
                    row.set_row_id_text("ORD-2");
                }
                _ => {}
            }
            Ok(())
        },
    );

    let mut single = Vec::new();
    resolver.collect_row_messages(&mut single, 1, false).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].text, "Needs review");
    assert_eq!(single[0].severity, SeverityKind::Warning);

    let mut all = Vec::new();
    resolver.collect_selected_rows_messages(&mut all, &[0, 1, 2]).unwrap();
    let texts: Vec<_> = all.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["Row 1 - Missing customer", "ORD-2 - Needs review"]);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_find_severity_row_boundaries() {
    let resolver = resolver(8).with_row_callback(|row| {
        if row.row() == 3 {
            row.add_error("Broken", "");
        }
        if row.row() == 6 {
            row.add_info("Note", "");
        }
        Ok(())
    });

    let find = |start, forward, threshold| {
        resolver
            .find_severity_row(start, forward, threshold)
            .unwrap()
    };
    assert_eq!(find(None, true, SeverityKind::Error), Some(3));
    assert_eq!(find(Some(3), true, SeverityKind::Error), None);
    assert_eq!(find(Some(3), true, SeverityKind::Info), Some(6));
    assert_eq!(find(None, false, SeverityKind::Info), Some(6));
    assert_eq!(find(Some(2), true, SeverityKind::None), Some(4));
    assert_eq!(find(Some(100), true, SeverityKind::Error), None);
    assert_eq!(find(Some(100), false, SeverityKind::Error), None);
    assert_eq!(resolver.worst_severity_over_table().unwrap(), SeverityKind::Error);
}

// ============================================================================
// Failures and reentrancy
// ============================================================================

#[test]
fn test_cell_callback_failure_restores_seeded_context() {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);

    let mut resolver = resolver(2).with_cell_callback(|cell| {
        cell.set_read_only(true);
        cell.set_color_category(ColorCategory::Header);
        Err(format!("no format for column {}", cell.column()).into())
    });
    resolver.set_failure_hook(Some(Arc::new(move |failure: &CallbackFailure| {
        sink.lock().push(failure.clone());
    })));

    resolver.row_info(1, QueryReason::Display).unwrap();
    for _ in 0..3 {
        let cell = resolver.cell_info(0).unwrap();
        assert!(!cell.is_read_only());
        assert_eq!(cell.color_category(), ColorCategory::Alternate);
    }
    resolver.cell_info(1).unwrap();

    let failures = failures.lock();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].column, Some(0));
    assert_eq!(failures[0].message, "no format for column 0");
    assert!(matches!(failures[0].to_error(), GridError::Callback { .. }));
}

#[test]
fn test_broken_callback_reported_once_across_redraws() {
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&hook_calls);

    let mut resolver = resolver(50)
        .with_row_callback(|row| Err(format!("lookup failed for row {}", row.row()).into()));
    resolver.set_failure_hook(Some(Arc::new(move |_failure: &CallbackFailure| {
        counted.fetch_add(1, Ordering::SeqCst);
    })));

    for _redraw in 0..3 {
        for row in 0..50 {
            resolver.row_info(row, QueryReason::Display).unwrap();
        }
    }

    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.failures().reported_count(), 1);
    assert_eq!(resolver.failures().suppressed_count(), 149);
}

#[test]
fn test_detach_clears_failure_history() {
    let resolver = resolver(1).with_row_callback(|_row| Err("offline".into()));

    resolver.row_info(0, QueryReason::Display).unwrap();
    resolver.row_info(0, QueryReason::Display).unwrap();
    assert_eq!(resolver.failures().reported_count(), 1);

    resolver.detach().unwrap();
    assert_eq!(resolver.failures().reported_count(), 0);
    assert!(resolver.cell_info(0).is_err());

    resolver.row_info(0, QueryReason::Display).unwrap();
    assert_eq!(resolver.failures().reported_count(), 1);
}
