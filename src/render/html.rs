//! Self-contained HTML documents for a rendered network

use crate::config::RenderConfig;
use crate::error::{CharnetError, Result};
use crate::network::CharacterGraph;
use crate::render::GraphPayload;
use crate::utils::ensure_parent_directory;
use std::path::Path;

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Character Network</title>
<script type="text/javascript" src="__SCRIPT_URL__"></script>
<style>
  body { margin: 0; background-color: __BACKGROUND__; }
  #network { width: __WIDTH__; height: __HEIGHT__; background-color: __BACKGROUND__; }
</style>
</head>
<body>
<div id="network"></div>
<script type="text/javascript">
  const payload = __PAYLOAD__;
  const container = document.getElementById("network");
  const data = {
    nodes: new vis.DataSet(payload.nodes),
    edges: new vis.DataSet(payload.edges),
  };
  new vis.Network(container, data, payload.options);
</script>
</body>
</html>
"##;

/// Render `graph` as an interactive page
pub fn render_html(graph: &CharacterGraph, config: &RenderConfig) -> Result<String> {
    render_payload_html(&GraphPayload::from_graph(graph, config), config)
}

/// Embed an already built payload in a page
pub fn render_payload_html(payload: &GraphPayload, config: &RenderConfig) -> Result<String> {
    // "</" inside the inline script would end it early
    let payload_json = payload.to_json()?.replace("</", "<\\/");

    Ok(PAGE_TEMPLATE
        .replace("__SCRIPT_URL__", &escape_html(&config.vis_script_url))
        .replace("__BACKGROUND__", &escape_css(&config.background))
        .replace("__WIDTH__", &escape_css(&config.width))
        .replace("__HEIGHT__", &escape_css(&config.height))
        .replace("__PAYLOAD__", &payload_json))
}

/// Render and write the page to `path`
pub fn write_html<P: AsRef<Path>>(graph: &CharacterGraph, config: &RenderConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    let html = render_html(graph, config)?;
    ensure_parent_directory(path)?;
    std::fs::write(path, html).map_err(|e| {
        CharnetError::Render(format!("Failed to write {}: {}", path.display(), e))
    })?;

    log::info!("Wrote network page to {}", path.display());
    Ok(())
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keep style values from closing the declaration or the style element
fn escape_css(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::CooccurrenceEdge;

    #[test]
    fn test_page_embeds_payload() {
        let graph = CharacterGraph::from_edges(vec![
            CooccurrenceEdge::new("Naruto", "Sasuke", 3).unwrap(),
        ]);
        let html = render_html(&graph, &RenderConfig::default()).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("vis-network"));
        assert!(html.contains(r#""from":"Naruto""#));
        assert!(html.contains("width: 1000px"));
        assert!(html.contains("#222222"));
        assert!(!html.contains("__PAYLOAD__"));
    }

    #[test]
    fn test_empty_graph_is_valid_page() {
        let html = render_html(&CharacterGraph::default(), &RenderConfig::default()).unwrap();
        assert!(html.contains(r#""nodes":[]"#));
        assert!(html.contains(r#""edges":[]"#));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_script_breakout_escaped() {
        let graph = CharacterGraph::from_edges(vec![
            CooccurrenceEdge::new("</script>", "Naruto", 1).unwrap(),
        ]);
        let html = render_html(&graph, &RenderConfig::default()).unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains(r"<\/script>"));
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("graph.html");
        write_html(&CharacterGraph::default(), &RenderConfig::default(), &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("vis.Network"));
    }
}
