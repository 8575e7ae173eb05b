use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pikawatch::data::{merge_network_by_interface, merge_series, ChartData};
use pikawatch::source::MetricsPayload;
use pikawatch_types::{MetricSeries, MetricType, NetworkMetricByInterface, RangeToken, TimeWindow};

const STEP_MS: i64 = 60_000;

fn network_series(points: usize) -> Vec<MetricSeries> {
    let mut upload = MetricSeries::new("upload");
    let mut download = MetricSeries::new("download");
    for i in 0..points {
        let ts = i as i64 * STEP_MS;
        upload = upload.point(ts, (i * 1024) as f64);
        download = download.point(ts, (i * 4096) as f64);
    }
    vec![upload, download]
}

fn interface_metrics(points: usize, interfaces: usize) -> Vec<NetworkMetricByInterface> {
    (0..points)
        .flat_map(|i| {
            (0..interfaces).map(move |n| NetworkMetricByInterface {
                timestamp: i as i64 * STEP_MS,
                interface: format!("eth{}", n),
                sent_rate: (i * 512) as f64,
                recv_rate: (i * 2048) as f64,
            })
        })
        .collect()
}

/// Merge two network series of growing length
fn bench_merge_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_series");

    // 1h of minutes, 1d, 7d
    for points in [60, 1_440, 10_080] {
        let series = network_series(points);
        group.throughput(Throughput::Elements((points * 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), &series, |b, series| {
            b.iter(|| black_box(merge_series(series, MetricType::Network)));
        });
    }
    group.finish();
}

/// Merge per-interface rows with a varying number of interfaces
fn bench_merge_interfaces(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_network_by_interface");

    for interfaces in [1, 4, 16] {
        let metrics = interface_metrics(1_440, interfaces);
        group.throughput(Throughput::Elements(metrics.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(interfaces),
            &metrics,
            |b, metrics| {
                b.iter(|| black_box(merge_network_by_interface(metrics)));
            },
        );
    }
    group.finish();
}

/// Full chart build including stats
fn bench_chart_from_payload(c: &mut Criterion) {
    let payload = MetricsPayload::Series(network_series(1_440));
    let window = TimeWindow::Range(RangeToken::D1);

    c.bench_function("chart_from_payload", |b| {
        b.iter(|| black_box(ChartData::from_payload(&payload, MetricType::Network, window)));
    });
}

criterion_group!(
    benches,
    bench_merge_series,
    bench_merge_interfaces,
    bench_chart_from_payload
);
criterion_main!(benches);
