//! Counter Example - Writes re-render through the reconciler
//!
//! This example demonstrates the render loop:
//! - Mounting an app onto an in-memory host
//! - Writing to observed data and seeing the host tree follow
//! - Inspecting the exact host mutations of each pass
//!
//! Run with: RUST_LOG=spark_vdom=debug cargo run --example counter

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use spark_vdom::{App, Attrs, MemoryHost, MountOptions, attrs};
use tracing_subscriber::EnvFilter;

fn main() -> spark_vdom::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== spark-vdom Counter Example ===\n");

    let host = Rc::new(RefCell::new(MemoryHost::with_mount_point("app")));

    let options = MountOptions::new(json!({ "count": 0, "step": 1 }), |data, h| {
        let count = data.get("count");
        let parity = if count.as_f64().unwrap_or(0.0) % 2.0 == 0.0 { "even" } else { "odd" };
        h(
            "div",
            attrs([("class", parity)]),
            vec![
                h("span", Attrs::new(), vec![format!("count = {count}").into()])?.into(),
                h("small", Attrs::new(), vec![format!("step {}", data.get("step")).into()])?.into(),
            ],
        )
    })
    .el("#app");

    let app = App::new(options, host.clone())?;
    print_host("mounted", &host);

    for _ in 0..3 {
        let step = app.get("step").as_f64().unwrap_or(1.0);
        let count = app.get("count").as_f64().unwrap_or(0.0);
        app.set("count", count + step);
        print_host("increment", &host);
    }

    app.set("step", 5);
    print_host("step = 5", &host);

    // Same value: nothing is notified.
    app.set("step", 5);
    print_host("step = 5 again", &host);

    app.unmount();
    app.set("count", 100);
    print_host("after unmount", &host);

    println!("Render passes: {}", app.render_count());
    Ok(())
}

fn print_host(label: &str, host: &Rc<RefCell<MemoryHost>>) {
    let mut host = host.borrow_mut();
    let mutations = host.take_mutations();
    println!("[{label}] {}", host.inner_html(host.root()));
    for mutation in &mutations {
        println!("    {mutation:?}");
    }
    println!();
}
