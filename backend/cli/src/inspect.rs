//! `stepflow menu`: print the resolved command graph.

use std::fmt::Write;

use stepflow_commands::{menu_keyboard, CommandGraph};

pub fn render_graph(graph: &CommandGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} commands", graph.len());

    for (category, entries) in graph.categories() {
        let _ = writeln!(out, "\n[{category}]");
        for entry in entries {
            let step = &entry.step;
            let role = match &step.prev {
                None => "head".to_string(),
                Some(prev) => format!("after {}", prev.name),
            };
            let mut flags = Vec::new();
            if entry.descriptor.cancellable {
                flags.push("cancellable");
            }
            if step.auxiliary_data.is_some() {
                flags.push("data");
            }
            let flags = if flags.is_empty() { String::new() } else { format!(" ({})", flags.join(", ")) };
            let _ = writeln!(
                out,
                "  {} [order {}, {role}]{flags}: {}",
                step.name,
                step.order,
                step.chain_names().join(" -> ")
            );
            if step.is_head() && step.next.is_some() {
                if let Some(sequence) = graph.sequence(&step.name) {
                    let _ = writeln!(out, "    by order: {}", sequence.names().join(", "));
                }
            }
        }
    }

    let _ = writeln!(out, "\nMenu:");
    let keyboard = menu_keyboard(graph);
    if keyboard.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for row in keyboard {
        let labels: Vec<&str> = row.iter().map(|b| b.label.as_str()).collect();
        let _ = writeln!(out, "  | {} |", labels.join(" | "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_commands;

    #[test]
    fn demo_graph_renders_chains_and_menu() {
        let graph = CommandGraph::build(demo_commands()).unwrap();
        let text = render_graph(&graph);
        assert!(text.starts_with("7 commands"));
        assert!(text.contains("FirstCommand [order 1, head] (cancellable): FirstCommand -> SecondCommand"));
        assert!(text.contains("SecondCommand [order 2, after FirstCommand]: SecondCommand"));
        assert!(text.contains("    by order: FirstCommand, SecondCommand"));
        assert!(text.contains("    by order: Register, Age, Welcome"));
        assert!(text.contains("| FirstCommand |"));
        assert!(text.contains("| Register |"));
        assert!(!text.contains("| SecondCommand"));
    }

    #[test]
    fn chains_list_steps_by_order() {
        use stepflow_commands::{CommandDescriptor, Noop};
        let graph = CommandGraph::build(vec![
            CommandDescriptor::new("Intro", Noop).next("Details").order(2),
            CommandDescriptor::new("Details", Noop).order(1),
        ])
        .unwrap();
        let text = render_graph(&graph);
        assert!(text.contains("Intro [order 2, head]: Intro -> Details"));
        assert!(text.contains("    by order: Details, Intro"));
    }

    #[test]
    fn empty_graph_has_empty_menu() {
        let graph = CommandGraph::build(Vec::new()).unwrap();
        assert!(render_graph(&graph).contains("(empty)"));
    }
}
