//! Todo List Example - Arrays, nested objects and positional list diffing
//!
//! This example demonstrates:
//! - Observed arrays whose push/remove/set re-render
//! - Nested objects replaced wholesale and still observed
//! - Growing and shrinking lists reconciled by position
//!
//! Run with: RUST_LOG=spark_vdom=debug cargo run --example todo_list

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use spark_vdom::{App, Attrs, Child, Error, MemoryHost, MountOptions, attrs};
use tracing_subscriber::EnvFilter;

fn main() -> spark_vdom::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== spark-vdom Todo List Example ===\n");

    let host = Rc::new(RefCell::new(MemoryHost::with_mount_point("app")));

    let data = json!({
        "owner": { "name": "ada" },
        "todos": [
            { "title": "write parser", "done": true },
            { "title": "write tests", "done": false },
        ],
    });

    let options = MountOptions::new(data, |data, h| {
        let todos = data.get("todos");
        let items = todos
            .as_array()
            .map(|todos| todos.to_vec())
            .unwrap_or_default()
            .iter()
            .map(|todo| {
                let class = if todo.get("done").as_bool() == Some(true) { "done" } else { "open" };
                h("li", attrs([("class", class)]), vec![todo.get("title").to_string().into()])
                    .map(Child::from)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        h(
            "section",
            Attrs::new(),
            vec![
                h("h2", Attrs::new(), vec![format!("{}'s todos", data.get_path("owner.name")).into()])?
                    .into(),
                h("ul", Attrs::new(), items)?.into(),
            ],
        )
    })
    .el("#app");

    let app = App::new(options, host.clone())?;
    print_host("mounted", &host);

    let value = app.get("todos");
    let Some(todos) = value.as_array().cloned() else {
        return Err(Error::InvalidData(value.kind()));
    };

    todos.push(json!({ "title": "ship", "done": false }));
    print_host("push", &host);

    app.set_path("todos.1.done", true);
    print_host("complete #1", &host);

    todos.remove(0);
    print_host("remove #0", &host);

    app.set("owner", json!({ "name": "grace" }));
    print_host("new owner", &host);

    app.set_path("owner.name", "linus");
    print_host("rename owner", &host);

    todos.clear();
    print_host("clear", &host);

    println!("Render passes: {}", app.render_count());
    if let Some(err) = app.take_last_error() {
        println!("Last error: {err}");
    }
    Ok(())
}

fn print_host(label: &str, host: &Rc<RefCell<MemoryHost>>) {
    let mut host = host.borrow_mut();
    let mutations = host.take_mutations();
    println!("[{label}] {}", host.inner_html(host.root()));
    println!("    {} mutation(s)", mutations.len());
    println!();
}
