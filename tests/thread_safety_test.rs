//! Validators and nodes are plain shared values: they can be cloned into
//! other threads and used concurrently.

use serde_json::json;
use shapeql::{Projection, QueryNode, Shape};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_parse_with_shared_node() {
    let node = Arc::new(
        QueryNode::new()
            .star()
            .filter_by_type(["user"])
            .project(
                Projection::new()
                    .field("name", Shape::string())
                    .field("age", Shape::number().integer().positive()),
            )
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let node = Arc::clone(&node);
            thread::spawn(move || {
                let ok = node.parse(&json!([{"name": format!("User{}", i), "age": 20 + i}]));
                assert!(ok.is_ok());

                let bad = node.parse(&json!([{"name": i, "age": -1}])).unwrap_err();
                assert!(bad.to_string().starts_with("2 Parsing Errors:"));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_validator_shared_between_nodes() {
    let price = Shape::number().min(0.0);
    let root = QueryNode::new().star();

    let a = root
        .project(Projection::new().field("price", price.clone()))
        .unwrap();
    let b = root
        .filter("onSale")
        .project(Projection::new().field("salePrice", ("price * 0.8", price)))
        .unwrap();

    let handle = thread::spawn(move || a.parse(&json!([{"price": 10}])).is_ok());
    assert!(b.parse(&json!([{"salePrice": 8}])).is_ok());
    assert!(handle.join().unwrap());
}
