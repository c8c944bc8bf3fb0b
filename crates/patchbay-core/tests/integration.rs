//! End-to-end tests for the edit/compile/publish/render cycle.

use patchbay_core::{
    DEFAULT_MASTER_GAIN, EngineController, GraphModel, NodeId, NodeKind, RenderEngine, compile,
    engine_link,
};

const SAMPLE_RATE: f32 = 48_000.0;

/// Constant(freq) -> Sine -> Sink.
fn sine_patch(freq: f32) -> (GraphModel, NodeId, NodeId) {
    let mut graph = GraphModel::new();
    let freq_node = graph.add_node(NodeKind::Constant(freq)).unwrap();
    let osc = graph.add_node(NodeKind::Sine).unwrap();
    let sink = graph.add_node(NodeKind::Sink).unwrap();
    graph.connect(freq_node, 0, osc, 0).unwrap();
    graph.connect(osc, 0, sink, 0).unwrap();
    (graph, freq_node, osc)
}

fn collect(engine: &mut RenderEngine, n: usize) -> Vec<f32> {
    (0..n).map(|_| engine.next_sample()).collect()
}

fn publish(controller: &mut EngineController, graph: &GraphModel) {
    controller.publish(graph).unwrap();
}

#[test]
fn first_sample_of_a_sine_patch() {
    let (graph, _, _) = sine_patch(440.0);
    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);

    // sin(0) maps to 0.5 unipolar, scaled by the default master gain.
    assert_eq!(engine.next_sample(), 0.5 * DEFAULT_MASTER_GAIN);
}

#[test]
fn silence_before_first_publish_and_without_sink() {
    let (_, mut engine) = engine_link(SAMPLE_RATE);
    assert!(collect(&mut engine, 32).iter().all(|&s| s == 0.0));

    let mut graph = GraphModel::new();
    graph.add_node(NodeKind::Constant(1.0)).unwrap();
    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);
    assert!(collect(&mut engine, 32).iter().all(|&s| s == 0.0));
}

#[test]
fn identical_edits_render_identical_streams() {
    let (graph_a, _, _) = sine_patch(440.0);
    let (graph_b, _, _) = sine_patch(440.0);

    let (mut ctl_a, mut eng_a) = engine_link(SAMPLE_RATE);
    let (mut ctl_b, mut eng_b) = engine_link(SAMPLE_RATE);
    publish(&mut ctl_a, &graph_a);
    publish(&mut ctl_b, &graph_b);

    assert_eq!(collect(&mut eng_a, 512), collect(&mut eng_b, 512));
}

#[test]
fn plan_swap_preserves_oscillator_phase() {
    let (mut graph, _, _) = sine_patch(440.0);

    // Reference: one plan, uninterrupted.
    let (mut ref_ctl, mut ref_eng) = engine_link(SAMPLE_RATE);
    publish(&mut ref_ctl, &graph);
    let reference = collect(&mut ref_eng, 400);

    // Same graph, but republished mid-stream after an unrelated edit.
    let (mut ctl, mut eng) = engine_link(SAMPLE_RATE);
    publish(&mut ctl, &graph);
    let mut stream = collect(&mut eng, 200);
    graph.add_node(NodeKind::Constant(7.0)).unwrap();
    publish(&mut ctl, &graph);
    stream.extend(collect(&mut eng, 200));

    assert_eq!(stream, reference);
}

#[test]
fn frequency_edit_keeps_the_waveform_continuous() {
    let (mut graph, freq_node, _) = sine_patch(440.0);
    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);

    let mut stream = collect(&mut engine, 100);
    graph.set_constant_value(freq_node, 880.0).unwrap();
    publish(&mut controller, &graph);
    stream.extend(collect(&mut engine, 100));

    // A phase jump would show as a step far above the slew of an 880 Hz
    // unipolar sine at this rate.
    let max_slew = core::f32::consts::PI * 880.0 / SAMPLE_RATE * DEFAULT_MASTER_GAIN;
    for pair in stream.windows(2) {
        assert!(
            (pair[1] - pair[0]).abs() <= max_slew * 1.01,
            "discontinuity: {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn removed_then_readded_oscillator_restarts_at_phase_zero() {
    let (mut graph, _, osc) = sine_patch(200.0);
    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);
    collect(&mut engine, 150);

    // Replace the oscillator. The new node has a new id, so no carry.
    let freq_node = graph
        .nodes()
        .find(|(_, k)| matches!(k, NodeKind::Constant(_)))
        .unwrap()
        .0;
    let sink = graph.sink().unwrap();
    graph.remove_node(osc).unwrap();
    let osc2 = graph.add_node(NodeKind::Sine).unwrap();
    graph.connect(freq_node, 0, osc2, 0).unwrap();
    graph.connect(osc2, 0, sink, 0).unwrap();
    publish(&mut controller, &graph);

    assert_eq!(engine.next_sample(), 0.5 * DEFAULT_MASTER_GAIN);
}

#[test]
fn unreachable_branch_does_not_reach_the_mix() {
    let (mut graph, _, _) = sine_patch(440.0);
    let (mut ref_ctl, mut ref_eng) = engine_link(SAMPLE_RATE);
    publish(&mut ref_ctl, &graph);
    let reference = collect(&mut ref_eng, 256);

    // A dangling loud branch must not change the output.
    let loud = graph.add_node(NodeKind::Constant(100.0)).unwrap();
    let square = graph.add_node(NodeKind::Square).unwrap();
    graph.connect(loud, 0, square, 0).unwrap();
    let (mut ctl, mut eng) = engine_link(SAMPLE_RATE);
    publish(&mut ctl, &graph);

    assert_eq!(collect(&mut eng, 256), reference);
}

#[test]
fn arithmetic_chain_end_to_end() {
    // (6 + 2) * 3 / 4 = 6, times master gain.
    let mut graph = GraphModel::new();
    let six = graph.add_node(NodeKind::Constant(6.0)).unwrap();
    let two = graph.add_node(NodeKind::Constant(2.0)).unwrap();
    let three = graph.add_node(NodeKind::Constant(3.0)).unwrap();
    let four = graph.add_node(NodeKind::Constant(4.0)).unwrap();
    let add = graph.add_node(NodeKind::Add).unwrap();
    let mul = graph.add_node(NodeKind::Multiply).unwrap();
    let div = graph.add_node(NodeKind::Divide).unwrap();
    let sink = graph.add_node(NodeKind::Sink).unwrap();
    graph.connect(six, 0, add, 0).unwrap();
    graph.connect(two, 0, add, 1).unwrap();
    graph.connect(add, 0, mul, 0).unwrap();
    graph.connect(three, 0, mul, 1).unwrap();
    graph.connect(mul, 0, div, 0).unwrap();
    graph.connect(four, 0, div, 1).unwrap();
    graph.connect(div, 0, sink, 0).unwrap();

    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    controller.set_master_gain(1.0).unwrap();
    publish(&mut controller, &graph);
    assert_eq!(engine.next_sample(), 6.0);
}

#[test]
fn division_by_zero_renders_silence() {
    let mut graph = GraphModel::new();
    let num = graph.add_node(NodeKind::Constant(5.0)).unwrap();
    let div = graph.add_node(NodeKind::Divide).unwrap();
    let sink = graph.add_node(NodeKind::Sink).unwrap();
    graph.connect(num, 0, div, 0).unwrap();
    // Denominator left unconnected: resolves to 0.0.
    graph.connect(div, 0, sink, 0).unwrap();

    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);
    assert_eq!(engine.next_sample(), 0.0);
}

#[test]
fn reset_then_rebuild_starts_clean() {
    let (mut graph, _, _) = sine_patch(440.0);
    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);
    collect(&mut engine, 300);

    controller.reset().unwrap();
    graph.reset();
    assert_eq!(engine.next_sample(), 0.0);
    assert!((engine.elapsed_seconds() - 1.0 / f64::from(SAMPLE_RATE)).abs() < 1e-9);

    // Rebuilt nodes get fresh ids and fresh phase.
    let (graph2, _, _) = sine_patch(440.0);
    publish(&mut controller, &graph2);
    let first = engine.next_sample();
    assert_eq!(first, 0.5 * DEFAULT_MASTER_GAIN);
}

#[test]
fn master_gain_scales_the_sink_value() {
    let mut graph = GraphModel::new();
    let c = graph.add_node(NodeKind::Constant(1.0)).unwrap();
    let sink = graph.add_node(NodeKind::Sink).unwrap();
    graph.connect(c, 0, sink, 0).unwrap();

    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);
    assert_eq!(engine.next_sample(), DEFAULT_MASTER_GAIN);

    controller.set_master_gain(0.5).unwrap();
    assert_eq!(engine.next_sample(), 0.5);
}

#[test]
fn interleaved_render_duplicates_frames_across_channels() {
    let (graph, _, _) = sine_patch(440.0);
    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    publish(&mut controller, &graph);

    let mut buffer = [0.0f32; 64];
    engine.render(&mut buffer, 2);
    for frame in buffer.chunks(2) {
        assert_eq!(frame[0], frame[1]);
    }
}

#[test]
fn compile_epochs_are_monotonic_per_controller() {
    let (graph, _, _) = sine_patch(440.0);
    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);

    let e1 = controller.publish(&graph).unwrap();
    let e2 = controller.publish(&graph).unwrap();
    assert!(e2 > e1);

    engine.next_sample();
    assert_eq!(engine.active_epoch(), e2);
}

#[test]
fn standalone_plan_matches_engine_output() {
    let (graph, _, _) = sine_patch(440.0);
    let mut plan = compile(&graph, &[], 1).unwrap();

    let (mut controller, mut engine) = engine_link(SAMPLE_RATE);
    controller.set_master_gain(1.0).unwrap();
    publish(&mut controller, &graph);

    for _ in 0..256 {
        assert_eq!(plan.run_sample(1.0 / SAMPLE_RATE), engine.next_sample());
    }
}
