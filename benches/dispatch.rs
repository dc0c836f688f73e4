use brrtrest::config::RestConfig;
use brrtrest::resource::TestStore;
use brrtrest::serializers::{to_csv, to_xml};
use brrtrest::server::{RestRequest, RestService};
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::Value;
use std::hint::black_box;

fn service() -> RestService {
    RestService::new(RestConfig::default())
        .expect("default prefix table")
        .with_demo(TestStore::seeded(), None)
}

fn bench_json_dispatch(c: &mut Criterion) {
    let svc = service();
    c.bench_function("dispatch_get_json", |b| {
        b.iter(|| {
            let req = RestRequest::new("GET", "/rest/test/3")
                .with_header("Accept", "text/html;q=0.5, application/json")
                .with_header("Accept-Language", "en");
            let resp = svc.handle(black_box(req)).expect("immediate mode");
            black_box(resp.status);
        })
    });
}

fn bench_listing_by_extension(c: &mut Criterion) {
    let svc = service();
    let mut group = c.benchmark_group("dispatch_list");
    for ext in ["json", "xml", "csv"] {
        let path = format!("/rest/test.{ext}");
        group.bench_function(ext, |b| {
            b.iter(|| {
                let resp = svc
                    .handle(RestRequest::new("GET", black_box(&path)))
                    .expect("immediate mode");
                black_box(resp.body.len());
            })
        });
    }
    group.finish();
}

fn bench_serializers(c: &mut Criterion) {
    let records = Value::Array(TestStore::seeded().all());
    c.bench_function("to_xml_records", |b| {
        b.iter(|| to_xml(black_box(&records), "test").expect("xml"))
    });
    c.bench_function("to_csv_records", |b| {
        b.iter(|| to_csv(black_box(&records)).expect("csv"))
    });
}

criterion_group!(
    benches,
    bench_json_dispatch,
    bench_listing_by_extension,
    bench_serializers
);
criterion_main!(benches);
