//! Raw-table normalization — reshape a provider response into the canonical
//! close-price frame and derive daily returns from it.
//!
//! Providers disagree about column layout: fields nested under tickers,
//! tickers nested under fields, or a flat single-field table when only one
//! symbol was requested. The response is classified into exactly one of
//! those shapes before extraction, so every branch is testable on its own.
//! Within a shape, "Close" is preferred over "Adj Close".

use chrono::NaiveDate;

use super::provider::DataError;
use super::table::{ColumnLabel, RawPriceTable, TickerFrame};

/// Price fields recognized during extraction, in preference order.
const FIELD_PREFERENCE: [&str; 2] = ["Close", "Adj Close"];

/// The recognized layouts of a raw provider table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawShape {
    /// Two-level columns, outer = ticker, inner = field.
    TickerMajor,
    /// Two-level columns, outer = field, inner = ticker.
    FieldMajor,
    /// Single-level columns (single ticker or pre-flattened response).
    FlatSingleField,
}

/// Classify a raw table into one of the recognized shapes.
///
/// Mixed flat/nested labels and nestings with no recognized price field at
/// either level are format errors — downstream math must never run against
/// a guessed column.
pub fn classify(table: &RawPriceTable) -> Result<RawShape, DataError> {
    let nested = table
        .columns
        .iter()
        .filter(|c| matches!(c.label, ColumnLabel::Nested { .. }))
        .count();

    if nested == 0 {
        return Ok(RawShape::FlatSingleField);
    }
    if nested != table.columns.len() {
        return Err(DataError::Format(
            "mixed flat and two-level column labels".into(),
        ));
    }

    let level_has_field = |inner_level: bool| {
        table.columns.iter().any(|c| match &c.label {
            ColumnLabel::Nested { outer, inner } => {
                let name = if inner_level { inner } else { outer };
                FIELD_PREFERENCE.contains(&name.as_str())
            }
            ColumnLabel::Flat(_) => false,
        })
    };

    // Field names can only appear at one level in practice; prefer the
    // ticker-major reading when a degenerate response matches both.
    if level_has_field(true) {
        Ok(RawShape::TickerMajor)
    } else if level_has_field(false) {
        Ok(RawShape::FieldMajor)
    } else {
        Err(DataError::Format(
            "two-level columns carry neither Close nor Adj Close at either level".into(),
        ))
    }
}

/// Normalize a raw provider table into the canonical close-price frame.
///
/// `requested` is the caller's deduplicated ticker list; it fixes the output
/// column order. Tickers missing from the response are dropped silently.
/// Rows that are NaN across every surviving column are removed. Zero
/// surviving columns is a [`DataError::EmptyResult`].
pub fn normalize(table: &RawPriceTable, requested: &[String]) -> Result<TickerFrame, DataError> {
    if table.columns.is_empty() {
        return Err(DataError::EmptyResult);
    }

    let shape = classify(table)?;
    let extracted: Vec<(String, Vec<f64>)> = match shape {
        RawShape::TickerMajor => extract_nested(table, true),
        RawShape::FieldMajor => extract_nested(table, false),
        RawShape::FlatSingleField => extract_flat(table, requested)?,
    };

    let mut tickers = Vec::new();
    let mut columns = Vec::new();
    for t in requested {
        if let Some((_, values)) = extracted.iter().find(|(name, _)| name == t) {
            tickers.push(t.clone());
            columns.push(values.clone());
        }
    }
    if tickers.is_empty() {
        return Err(DataError::EmptyResult);
    }

    let (dates, columns) = sort_by_date(table.dates.clone(), columns);
    Ok(TickerFrame::new(dates, tickers, columns).drop_all_nan_rows())
}

/// Pull the preferred price field out of a two-level table.
///
/// `field_on_inner` selects the reading: ticker-major tables carry the field
/// name on the inner level, field-major tables on the outer. The first
/// preference field present at all wins for the whole table.
fn extract_nested(table: &RawPriceTable, field_on_inner: bool) -> Vec<(String, Vec<f64>)> {
    for field in FIELD_PREFERENCE {
        let matching: Vec<(String, Vec<f64>)> = table
            .columns
            .iter()
            .filter_map(|c| match &c.label {
                ColumnLabel::Nested { outer, inner } => {
                    let (f, ticker) = if field_on_inner {
                        (inner, outer)
                    } else {
                        (outer, inner)
                    };
                    (f == field).then(|| (ticker.clone(), c.values.clone()))
                }
                ColumnLabel::Flat(_) => None,
            })
            .collect();
        if !matching.is_empty() {
            return matching;
        }
    }
    // classify() guaranteed at least one preference field exists.
    Vec::new()
}

/// Flat layout: take the preferred field column directly. A single-ticker
/// request labels the sole column with that ticker (providers may omit the
/// symbol name when only one was asked for).
fn extract_flat(
    table: &RawPriceTable,
    requested: &[String],
) -> Result<Vec<(String, Vec<f64>)>, DataError> {
    for field in FIELD_PREFERENCE {
        let found = table.columns.iter().find(|c| match &c.label {
            ColumnLabel::Flat(name) => name == field,
            ColumnLabel::Nested { .. } => false,
        });
        if let Some(col) = found {
            let name = if requested.len() == 1 {
                requested[0].clone()
            } else {
                field.to_string()
            };
            return Ok(vec![(name, col.values.clone())]);
        }
    }
    Err(DataError::Format(
        "flat columns carry neither Close nor Adj Close".into(),
    ))
}

/// Sort rows ascending by date, permuting every column alongside the axis.
fn sort_by_date(dates: Vec<NaiveDate>, columns: Vec<Vec<f64>>) -> (Vec<NaiveDate>, Vec<Vec<f64>>) {
    if dates.windows(2).all(|w| w[0] <= w[1]) {
        return (dates, columns);
    }
    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&i| dates[i]);
    let sorted_dates = order.iter().map(|&i| dates[i]).collect();
    let sorted_columns = columns
        .iter()
        .map(|col| order.iter().map(|&i| col[i]).collect())
        .collect();
    (sorted_dates, sorted_columns)
}

/// Per-column fractional day-over-day change.
///
/// The leading row (no prior value) and any step across a NaN are NaN —
/// prices are never forward-filled to bridge a gap. Rows that end up NaN in
/// every column are dropped, which normally removes just the leading row.
pub fn daily_returns(close: &TickerFrame) -> TickerFrame {
    let columns: Vec<Vec<f64>> = close
        .tickers()
        .iter()
        .map(|t| {
            let col = close.column(t).unwrap_or(&[]);
            (0..col.len())
                .map(|i| {
                    if i == 0 {
                        f64::NAN
                    } else {
                        let prev = col[i - 1];
                        let cur = col[i];
                        if prev.is_finite() && cur.is_finite() {
                            (cur - prev) / prev
                        } else {
                            f64::NAN
                        }
                    }
                })
                .collect()
        })
        .collect();

    TickerFrame::new(
        close.dates().to_vec(),
        close.tickers().to_vec(),
        columns,
    )
    .drop_all_nan_rows()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::RawColumn;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dates3() -> Vec<NaiveDate> {
        vec![d("2024-01-02"), d("2024-01-03"), d("2024-01-04")]
    }

    fn ticker_major(field: &str) -> RawPriceTable {
        RawPriceTable {
            dates: dates3(),
            columns: vec![
                RawColumn {
                    label: ColumnLabel::nested("A", field),
                    values: vec![10.0, 11.0, 12.0],
                },
                RawColumn {
                    label: ColumnLabel::nested("B", field),
                    values: vec![20.0, 21.0, 22.0],
                },
            ],
        }
    }

    fn field_major(field: &str) -> RawPriceTable {
        RawPriceTable {
            dates: dates3(),
            columns: vec![
                RawColumn {
                    label: ColumnLabel::nested(field, "A"),
                    values: vec![10.0, 11.0, 12.0],
                },
                RawColumn {
                    label: ColumnLabel::nested(field, "B"),
                    values: vec![20.0, 21.0, 22.0],
                },
            ],
        }
    }

    fn req(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn classifies_all_three_shapes() {
        assert_eq!(classify(&ticker_major("Close")).unwrap(), RawShape::TickerMajor);
        assert_eq!(classify(&field_major("Close")).unwrap(), RawShape::FieldMajor);

        let flat = RawPriceTable {
            dates: dates3(),
            columns: vec![RawColumn {
                label: ColumnLabel::Flat("Close".into()),
                values: vec![10.0, 11.0, 12.0],
            }],
        };
        assert_eq!(classify(&flat).unwrap(), RawShape::FlatSingleField);
    }

    #[test]
    fn both_nestings_normalize_identically() {
        let a = normalize(&ticker_major("Close"), &req(&["A", "B"])).unwrap();
        let b = normalize(&field_major("Close"), &req(&["A", "B"])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tickers(), &["A".to_string(), "B".to_string()]);
        assert_eq!(a.column("B").unwrap(), &[20.0, 21.0, 22.0]);
    }

    #[test]
    fn adj_close_is_the_fallback_field() {
        let frame = normalize(&ticker_major("Adj Close"), &req(&["A", "B"])).unwrap();
        assert_eq!(frame.column("A").unwrap(), &[10.0, 11.0, 12.0]);

        // When both fields exist, Close wins.
        let mut both = ticker_major("Close");
        both.columns.push(RawColumn {
            label: ColumnLabel::nested("A", "Adj Close"),
            values: vec![1.0, 1.0, 1.0],
        });
        let frame = normalize(&both, &req(&["A"])).unwrap();
        assert_eq!(frame.column("A").unwrap(), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn flat_single_ticker_takes_the_requested_name() {
        let flat = RawPriceTable {
            dates: dates3(),
            columns: vec![RawColumn {
                label: ColumnLabel::Flat("Close".into()),
                values: vec![10.0, 11.0, 12.0],
            }],
        };
        let frame = normalize(&flat, &req(&["EQNR.OL"])).unwrap();
        assert_eq!(frame.tickers(), &["EQNR.OL".to_string()]);
    }

    #[test]
    fn flat_response_for_a_multi_ticker_request_is_empty() {
        // A flat table can't be attributed to any one of several requested
        // tickers, so nothing survives the reorder step.
        let flat = RawPriceTable {
            dates: dates3(),
            columns: vec![RawColumn {
                label: ColumnLabel::Flat("Close".into()),
                values: vec![10.0, 11.0, 12.0],
            }],
        };
        assert!(matches!(
            normalize(&flat, &req(&["A", "B"])),
            Err(DataError::EmptyResult)
        ));
    }

    #[test]
    fn unrecognized_fields_are_a_format_error() {
        let table = RawPriceTable {
            dates: dates3(),
            columns: vec![RawColumn {
                label: ColumnLabel::nested("A", "Volume"),
                values: vec![1.0, 2.0, 3.0],
            }],
        };
        assert!(matches!(
            normalize(&table, &req(&["A"])),
            Err(DataError::Format(_))
        ));

        let flat = RawPriceTable {
            dates: dates3(),
            columns: vec![RawColumn {
                label: ColumnLabel::Flat("Volume".into()),
                values: vec![1.0, 2.0, 3.0],
            }],
        };
        assert!(matches!(
            normalize(&flat, &req(&["A"])),
            Err(DataError::Format(_))
        ));
    }

    #[test]
    fn missing_tickers_are_dropped_without_error() {
        let frame = normalize(&ticker_major("Close"), &req(&["X", "A", "Y", "B", "Z"])).unwrap();
        assert_eq!(frame.tickers(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn requested_order_is_preserved() {
        let frame = normalize(&ticker_major("Close"), &req(&["B", "A"])).unwrap();
        assert_eq!(frame.tickers(), &["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn no_surviving_tickers_is_empty_result() {
        assert!(matches!(
            normalize(&ticker_major("Close"), &req(&["X", "Y"])),
            Err(DataError::EmptyResult)
        ));
        assert!(matches!(
            normalize(&RawPriceTable::default(), &req(&["A"])),
            Err(DataError::EmptyResult)
        ));
    }

    #[test]
    fn unsorted_dates_are_sorted_ascending() {
        let table = RawPriceTable {
            dates: vec![d("2024-01-04"), d("2024-01-02"), d("2024-01-03")],
            columns: vec![RawColumn {
                label: ColumnLabel::nested("A", "Close"),
                values: vec![12.0, 10.0, 11.0],
            }],
        };
        let frame = normalize(&table, &req(&["A"])).unwrap();
        assert_eq!(frame.dates(), &[d("2024-01-02"), d("2024-01-03"), d("2024-01-04")]);
        assert_eq!(frame.column("A").unwrap(), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn nan_rows_and_returns_follow_the_gap_rules() {
        // A = [10, 11, NaN], B = [20, NaN, 22] over D1..D3.
        let table = RawPriceTable {
            dates: dates3(),
            columns: vec![
                RawColumn {
                    label: ColumnLabel::nested("A", "Close"),
                    values: vec![10.0, 11.0, f64::NAN],
                },
                RawColumn {
                    label: ColumnLabel::nested("B", "Close"),
                    values: vec![20.0, f64::NAN, 22.0],
                },
            ],
        };
        let close = normalize(&table, &req(&["A", "B"])).unwrap();

        // No row is all-NaN, so all three survive with their exact pattern.
        assert_eq!(close.height(), 3);
        assert!(close.column("A").unwrap()[2].is_nan());
        assert!(close.column("B").unwrap()[1].is_nan());

        // Returns: leading row dropped; D2 keeps A's 10% move with B NaN;
        // D3 is NaN in both columns (no fill across B's gap) and is dropped.
        let returns = daily_returns(&close);
        assert_eq!(returns.height(), 1);
        assert_eq!(returns.dates()[0], d("2024-01-03"));
        assert!((returns.column("A").unwrap()[0] - 0.10).abs() < 1e-12);
        assert!(returns.column("B").unwrap()[0].is_nan());
    }

    #[test]
    fn all_nan_holiday_rows_are_dropped_from_close() {
        let table = RawPriceTable {
            dates: dates3(),
            columns: vec![
                RawColumn {
                    label: ColumnLabel::nested("A", "Close"),
                    values: vec![10.0, f64::NAN, 12.0],
                },
                RawColumn {
                    label: ColumnLabel::nested("B", "Close"),
                    values: vec![20.0, f64::NAN, 22.0],
                },
            ],
        };
        let close = normalize(&table, &req(&["A", "B"])).unwrap();
        assert_eq!(close.height(), 2);
        assert_eq!(close.dates(), &[d("2024-01-02"), d("2024-01-04")]);
    }

    #[test]
    fn returns_share_the_close_column_set() {
        let close = normalize(&ticker_major("Close"), &req(&["A", "B"])).unwrap();
        let returns = daily_returns(&close);
        assert_eq!(returns.tickers(), close.tickers());
        assert_eq!(returns.height(), close.height() - 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Output columns are always a subset of the request, in
            /// request order, and returns mirror the close column set.
            #[test]
            fn columns_subset_in_request_order(
                present in proptest::collection::vec(0usize..6, 1..6),
                requested in proptest::collection::vec(0usize..6, 1..6),
            ) {
                let names: Vec<String> = (0..6).map(|i| format!("T{i}")).collect();
                let table = RawPriceTable {
                    dates: dates3(),
                    columns: present
                        .iter()
                        .map(|&i| RawColumn {
                            label: ColumnLabel::nested(names[i].clone(), "Close"),
                            values: vec![10.0 + i as f64, 11.0, 12.0],
                        })
                        .collect(),
                };
                let mut req: Vec<String> = Vec::new();
                for &i in &requested {
                    if !req.contains(&names[i]) {
                        req.push(names[i].clone());
                    }
                }

                match normalize(&table, &req) {
                    Ok(close) => {
                        let expected: Vec<String> = req
                            .iter()
                            .filter(|t| present.iter().any(|&i| &names[i] == *t))
                            .cloned()
                            .collect();
                        prop_assert_eq!(close.tickers(), expected.as_slice());
                        let returns = daily_returns(&close);
                        prop_assert_eq!(returns.tickers(), close.tickers());
                    }
                    Err(DataError::EmptyResult) => {
                        prop_assert!(req
                            .iter()
                            .all(|t| !present.iter().any(|&i| &names[i] == t)));
                    }
                    Err(e) => return Err(TestCaseError::fail(format!("unexpected: {e}"))),
                }
            }
        }
    }
}
