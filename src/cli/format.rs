//! Output formatting for CLI display.

use std::fmt::Write;

use crate::playback::{AgentState, ForecastTrace};

use super::Summary;

/// Format an `inspect` summary for human-readable display.
pub(super) fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "map:        {}x{} ({} passable)",
        summary.width, summary.height, summary.passable
    );
    let _ = writeln!(out, "agents:     {}", summary.agents);
    let _ = writeln!(
        out,
        "timesteps:  {} (T = {})",
        summary.timesteps,
        summary.timesteps.saturating_sub(1)
    );

    match &summary.reference {
        Some(r) => {
            let history = r
                .history_size
                .map_or_else(|| "undeclared".to_string(), |h| h.to_string());
            let _ = writeln!(
                out,
                "reference:  {} agents, {} steps, history size {history}",
                r.agents, r.steps
            );
        }
        None => {
            let _ = writeln!(out, "reference:  none");
        }
    }

    if let Some(problem) = &summary.problem {
        let _ = writeln!(out, "problem:    {problem}");
    }
    out
}

fn format_heading(heading: Option<f64>) -> String {
    heading.map_or_else(|| "-".to_string(), |h| format!("{h:.1}"))
}

/// One line per agent: id, position, heading and a goal marker.
pub(super) fn format_agents(agents: &[AgentState]) -> String {
    let mut out = String::new();
    for a in agents {
        let goal = if a.at_goal { "  [goal]" } else { "" };
        let _ = writeln!(
            out,
            "{:>4}  ({:.3}, {:.3})  heading {}{goal}",
            a.agent,
            a.x,
            a.y,
            format_heading(a.heading)
        );
    }
    out
}

/// One line per agent: the forecast's cells in order.
pub(super) fn format_overlay(traces: &[ForecastTrace<'_>]) -> String {
    let mut out = String::new();
    for trace in traces {
        let cells = trace
            .poses
            .iter()
            .map(|p| match p.orientation.tag() {
                Some(tag) => format!("({},{},{tag})", p.node.x, p.node.y),
                None => format!("({},{})", p.node.x, p.node.y),
            })
            .collect::<Vec<_>>()
            .join(" -> ");
        let _ = writeln!(out, "{:>4}  {cells}", trace.agent);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cli::ReferenceSummary;
    use crate::graph::Grid;
    use crate::parse::parse_str;
    use crate::playback::Playback;

    #[test]
    fn agents_show_heading_and_goal() {
        let agents = [
            AgentState {
                agent: 0,
                x: 1.5,
                y: 2.0,
                heading: Some(90.0),
                at_goal: false,
            },
            AgentState {
                agent: 1,
                x: 3.0,
                y: 3.0,
                heading: None,
                at_goal: true,
            },
        ];

        let text = format_agents(&agents);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "   0  (1.500, 2.000)  heading 90.0");
        assert_eq!(lines[1], "   1  (3.000, 3.000)  heading -  [goal]");
    }

    #[test]
    fn overlay_lists_cells_in_order() {
        let grid = Grid::open(4, 4).unwrap();
        let plan = parse_str(
            "0:(0,0),\nlocal_guidance=\nstep0:\nagent0:(0,0,X_PLUS),(1,0),\n",
            &grid,
        )
        .unwrap();
        let playback = Playback::new(&plan.solution, plan.reference.as_ref()).unwrap();

        let text = format_overlay(&playback.overlay(0));
        assert_eq!(text, "   0  (0,0,X_PLUS) -> (1,0)\n");
    }

    #[test]
    fn summary_mentions_reference_and_problem() {
        let summary = Summary {
            width: 32,
            height: 32,
            passable: 922,
            timesteps: 10,
            agents: 4,
            problem: Some("solution has no configurations".to_string()),
            reference: Some(ReferenceSummary {
                history_size: None,
                agents: 4,
                steps: 9,
            }),
        };

        let text = format_summary(&summary);
        assert!(text.contains("32x32 (922 passable)"));
        assert!(text.contains("(T = 9)"));
        assert!(text.contains("history size undeclared"));
        assert!(text.contains("problem:"));
    }
}
