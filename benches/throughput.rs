use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use jsonapi_router::dispatcher::{ControllerKind, Dispatcher, HandlerResponse, JsonApiRequest};
use jsonapi_router::params::{parse_query_params, RawParams};
use jsonapi_router::path::{resolve_path, serialize_path};
use jsonapi_router::registry::{load_registry_from_str, RegistryFormat, ResourceRegistry};
use serde_json::json;

fn example_registry() -> &'static str {
    r#"resources:
  - type: zoos
    relationships: [animals, keepers]
    attributes: [name, city]
  - type: animals
    relationships: [zoo, toys, habitat]
    attributes: [name, species, age]
  - type: keepers
    relationships: [zoo, animals]
    attributes: [name]
  - type: toys
    relationships: [animal]
    attributes: [colour]
"#
}

fn registry() -> ResourceRegistry {
    load_registry_from_str(example_registry(), RegistryFormat::Yaml).expect("failed to load registry")
}

fn bench_path_resolution(c: &mut Criterion) {
    let registry = registry();
    c.bench_function("path_resolve", |b| {
        let test_paths = [
            "/animals",
            "/animals/123",
            "/animals/1,2,3,4,5",
            "/animals/123/zoo",
            "/zoos/9/relationships/keepers",
        ];
        b.iter(|| {
            for path in test_paths.iter() {
                let res = resolve_path(&registry, path);
                black_box(&res);
            }
        })
    });

    let resolved = resolve_path(&registry, "/zoos/9/relationships/keepers").expect("resolve");
    c.bench_function("path_serialize", |b| b.iter(|| black_box(serialize_path(&resolved))));
}

fn bench_param_parsing(c: &mut Criterion) {
    let raw = RawParams::from_query(
        "filter[animals][species]=lion&filter[animals][species]=tiger&filter[zoos][city]=Oslo\
         &sort[animals][age]=desc&include[animals]=zoo.keepers&fields[animals]=name\
         &page[number]=3&page[size]=25&utm_source=newsletter",
    );
    c.bench_function("params_parse", |b| {
        b.iter(|| {
            let res = parse_query_params(&raw);
            black_box(&res);
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = ControllerKind::ALL
        .into_iter()
        .fold(Dispatcher::builder(Arc::new(registry())), |builder, kind| {
            builder.controller(kind, move |req: &JsonApiRequest| -> anyhow::Result<HandlerResponse> {
                Ok(HandlerResponse::ok(json!({ "meta": { "type": req.path.resource_type() } })))
            })
        })
        .build();
    c.bench_function("dispatch_raw", |b| {
        b.iter(|| {
            let res = dispatcher.dispatch_raw(Method::GET, "/animals/123/relationships/toys", "page[size]=10", None);
            black_box(res.status);
        })
    });
}

criterion_group!(benches, bench_path_resolution, bench_param_parsing, bench_dispatch);
criterion_main!(benches);
