use weft_core::{
    component, create_element, Child, HostTree, MemoryHost, Props, PropValue, Renderer,
};
use weft_runtime_std::{drive_to_completion, StdRuntime};

const SLICE_MILLIS: u64 = 4;

fn greeting_card() -> weft_core::Element {
    let greeting = component(|props| {
        let name = match props.get("name") {
            Some(PropValue::Scalar(scalar)) => scalar.to_string(),
            _ => "stranger".to_owned(),
        };
        create_element(
            "p",
            Props::new().style([("color", "teal")]),
            vec![format!("Hello {name}").into()],
        )
        .into()
    });

    let names = ["Ada", "Grace", "Edsger"];
    let cards: Vec<Child> = names
        .iter()
        .map(|name| {
            create_element(greeting.clone(), Props::new().attr("name", *name), vec![]).into()
        })
        .collect();

    create_element(
        "div",
        Props::new()
            .attr("id", "app")
            .handler("onClick", || log::info!("app clicked")),
        vec![create_element("ul", Props::new(), cards).into()],
    )
}

fn main() {
    env_logger::init();

    println!("=== weft tree demo ===");
    println!("Renders a component tree into the in-memory host across");
    println!("time-sliced idle passes, then dumps the committed tree.");
    println!();

    let runtime = StdRuntime::new();
    let mut host = MemoryHost::new();
    let container = host.create_node("root").expect("container");
    let mut renderer = Renderer::with_scheduler(host, runtime.scheduler());

    renderer.render(greeting_card(), container);
    if let Err(err) = drive_to_completion(&runtime, &mut renderer, SLICE_MILLIS) {
        eprintln!("render failed: {err}");
        std::process::exit(1);
    }

    print!("{}", renderer.host().dump_tree(Some(container)));
}
