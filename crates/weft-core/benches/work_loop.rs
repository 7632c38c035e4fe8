use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weft_core::{
    component, create_element, Child, Element, HostTree, MemoryHost, Props, Renderer,
    RunToCompletion, UnitBudget,
};

const SECTION_COUNT: usize = 4;
const ROWS_PER_SECTION_SAMPLES: &[usize] = &[8, 16, 32, 64];

fn section_content(section: usize, rows: usize) -> Element {
    let row = component(|props| {
        let label = match props.get("label") {
            Some(weft_core::PropValue::Scalar(scalar)) => scalar.to_string(),
            _ => String::new(),
        };
        create_element("li", Props::new(), vec![Child::from(label)]).into()
    });
    let items: Vec<Child> = (0..rows)
        .map(|index| {
            create_element(
                row.clone(),
                Props::new().attr("label", format!("item {section}-{index}")),
                vec![],
            )
            .into()
        })
        .collect();
    create_element(
        "section",
        Props::new().attr("id", format!("section-{section}")),
        vec![
            create_element("h2", Props::new(), vec![format!("Section {section}").into()]).into(),
            create_element("ul", Props::new(), items).into(),
        ],
    )
}

fn page(sections: usize, rows: usize) -> Element {
    let children: Vec<Child> = (0..sections)
        .map(|section| section_content(section, rows).into())
        .collect();
    create_element("div", Props::new(), children)
}

fn render_once(rows: usize, sliced: bool) {
    let mut host = MemoryHost::new();
    let container = host.create_node("root").expect("container");
    let mut renderer = Renderer::new(host);
    renderer.render(page(SECTION_COUNT, rows), container);
    if sliced {
        while renderer.has_pending_work() {
            renderer
                .run_idle_pass(&UnitBudget::new(16))
                .expect("sliced pass");
        }
    } else {
        renderer
            .run_idle_pass(&RunToCompletion)
            .expect("single pass");
    }
    black_box(renderer.host().len());
}

fn bench_work_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("work_loop");
    for &rows in ROWS_PER_SECTION_SAMPLES {
        group.bench_with_input(
            BenchmarkId::new("single_pass", rows),
            &rows,
            |b, &rows| b.iter(|| render_once(rows, false)),
        );
        group.bench_with_input(
            BenchmarkId::new("sliced_16_units", rows),
            &rows,
            |b, &rows| b.iter(|| render_once(rows, true)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_work_loop);
criterion_main!(benches);
