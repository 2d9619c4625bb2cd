//! Normalization throughput over a dashboard-sized table
//! (5 tickers, ~5 years of daily rows).

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tickerlab_core::data::{
    daily_returns, normalize, ColumnLabel, RawColumn, RawPriceTable,
};

fn build_table(tickers: &[String], rows: usize) -> RawPriceTable {
    let start = NaiveDate::from_ymd_opt(2020, 10, 15).unwrap();
    let dates: Vec<NaiveDate> = (0..rows)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();

    let columns = tickers
        .iter()
        .enumerate()
        .map(|(t, ticker)| RawColumn {
            label: ColumnLabel::nested(ticker.clone(), "Close"),
            values: (0..rows)
                .map(|i| 100.0 + t as f64 + (i as f64 * 0.37).sin())
                .collect(),
        })
        .collect();

    RawPriceTable { dates, columns }
}

fn bench_normalize(c: &mut Criterion) {
    let tickers: Vec<String> = ["EQNR.OL", "DNB.OL", "AKRBP.OL", "ORK.OL", "MOWI.OL"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let table = build_table(&tickers, 1260);

    c.bench_function("normalize_5x1260", |b| {
        b.iter(|| normalize(black_box(&table), black_box(&tickers)).unwrap())
    });

    let close = normalize(&table, &tickers).unwrap();
    c.bench_function("daily_returns_5x1260", |b| {
        b.iter(|| daily_returns(black_box(&close)))
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
