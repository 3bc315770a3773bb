//! Interactive editor overlay embedded in chart fragments.
//!
//! The overlay is an absolutely positioned edit button plus a hidden modal
//! with a per-family table: `Label, Value` for primitive-data charts,
//! `X, Y` for scatter, `X, Y, Radius` for bubble. The save handler rebuilds
//! the chart's family-specific data shape, calls `chart.update()`, and
//! persists through the injected chart-data endpoint; a load-on-mount
//! handler overwrites the data before first render when a saved copy exists.

use crate::pipeline::types::EditorFamily;

#[derive(Debug, Clone, Copy)]
pub struct EditorContext<'a> {
    pub chart_id: &'a str,
    pub presentation_id: &'a str,
    /// Base URL for the chart-data persistence endpoints, injected from
    /// configuration. Empty string means same-origin.
    pub data_base_url: &'a str,
}

pub fn headers(family: EditorFamily) -> &'static [&'static str] {
    match family {
        EditorFamily::LabelValue => &["Label", "Value"],
        EditorFamily::Xy => &["X", "Y"],
        EditorFamily::Xyr => &["X", "Y", "Radius"],
    }
}

/// Edit button and modal markup. All ids are prefixed with the chart id so
/// multiple fragments coexist in one document.
pub fn markup(ctx: &EditorContext<'_>, family: EditorFamily) -> String {
    let cid = ctx.chart_id;
    let header_cells: String = headers(family)
        .iter()
        .map(|h| format!("<th style=\"text-align: left; padding: 6px 10px; border-bottom: 1px solid #e5e7eb;\">{h}</th>"))
        .collect::<Vec<_>>()
        .join("");
    format!(
        concat!(
            "<button id=\"{cid}_edit\" type=\"button\" style=\"position: absolute; top: 14px; right: 14px; z-index: 10; ",
            "padding: 6px 14px; border: 1px solid #d1d5db; border-radius: 6px; background: #ffffff; ",
            "color: #374151; font-size: 13px; cursor: pointer;\">Edit Data</button>\n",
            "<div id=\"{cid}_modal\" style=\"display: none; position: absolute; inset: 0; ",
            "background: rgba(17, 24, 39, 0.55); z-index: 20;\">\n",
            "<div style=\"position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); ",
            "width: 460px; max-height: 80%; overflow-y: auto; background: #ffffff; border-radius: 8px; ",
            "padding: 24px; box-sizing: border-box;\">\n",
            "<h4 style=\"margin: 0 0 12px 0; font-size: 16px; color: #1f2937;\">Edit Chart Data</h4>\n",
            "<table id=\"{cid}_table\" style=\"width: 100%; border-collapse: collapse; font-size: 13px;\">",
            "<thead><tr>{headers}<th></th></tr></thead><tbody></tbody></table>\n",
            "<div style=\"margin-top: 12px; display: flex; gap: 8px; justify-content: flex-end;\">\n",
            "<button id=\"{cid}_addrow\" type=\"button\" style=\"margin-right: auto; padding: 6px 12px; ",
            "border: 1px solid #d1d5db; border-radius: 6px; background: #ffffff; cursor: pointer;\">Add Row</button>\n",
            "<button id=\"{cid}_cancel\" type=\"button\" style=\"padding: 6px 12px; border: 1px solid #d1d5db; ",
            "border-radius: 6px; background: #ffffff; cursor: pointer;\">Cancel</button>\n",
            "<button id=\"{cid}_save\" type=\"button\" style=\"padding: 6px 14px; border: none; ",
            "border-radius: 6px; background: #2563eb; color: #ffffff; cursor: pointer;\">Save</button>\n",
            "</div>\n</div>\n</div>",
        ),
        cid = cid,
        headers = header_cells,
    )
}

/// Family-specific JS: how to read rows out of a live chart, how to rebuild
/// the chart data from rows, and how to apply a saved payload to the config.
fn family_js(family: EditorFamily) -> &'static str {
    match family {
        EditorFamily::LabelValue => concat!(
            "var rowsFromChart = function(chart) {\n",
            "  var labels = chart.data.labels || [];\n",
            "  var values = (chart.data.datasets[0] || {}).data || [];\n",
            "  return labels.map(function(label, i) { return [label, values[i]]; });\n",
            "};\n",
            "var applyRows = function(chart, rows) {\n",
            "  chart.data.labels = rows.map(function(r) { return String(r[0]); });\n",
            "  chart.data.datasets[0].data = rows.map(function(r) { return Number(r[1]) || 0; });\n",
            "};\n",
            "var payloadFromRows = function(rows) {\n",
            "  return {\n",
            "    labels: rows.map(function(r) { return String(r[0]); }),\n",
            "    values: rows.map(function(r) { return Number(r[1]) || 0; })\n",
            "  };\n",
            "};\n",
            "var applySavedData = function(payload) {\n",
            "  if (!payload || !payload.labels || !payload.values) { return; }\n",
            "  config.data.labels = payload.labels;\n",
            "  config.data.datasets[0].data = payload.values;\n",
            "};\n",
        ),
        EditorFamily::Xy => concat!(
            "var rowsFromChart = function(chart) {\n",
            "  var points = (chart.data.datasets[0] || {}).data || [];\n",
            "  return points.map(function(p) { return [p.x, p.y]; });\n",
            "};\n",
            "var applyRows = function(chart, rows) {\n",
            "  var old = chart.data.datasets[0].data || [];\n",
            "  chart.data.datasets[0].data = rows.map(function(r, i) {\n",
            "    var label = old[i] && old[i].label ? old[i].label : 'Point ' + (i + 1);\n",
            "    return { x: Number(r[0]) || 0, y: Number(r[1]) || 0, label: label };\n",
            "  });\n",
            "};\n",
            "var payloadFromRows = function(rows) {\n",
            "  return { points: rows.map(function(r) { return { x: Number(r[0]) || 0, y: Number(r[1]) || 0 }; }) };\n",
            "};\n",
            "var applySavedData = function(payload) {\n",
            "  if (!payload || !payload.points) { return; }\n",
            "  var old = config.data.datasets[0].data || [];\n",
            "  config.data.datasets[0].data = payload.points.map(function(p, i) {\n",
            "    var label = p.label || (old[i] && old[i].label) || 'Point ' + (i + 1);\n",
            "    return { x: Number(p.x) || 0, y: Number(p.y) || 0, label: label };\n",
            "  });\n",
            "};\n",
        ),
        EditorFamily::Xyr => concat!(
            "var rowsFromChart = function(chart) {\n",
            "  var points = (chart.data.datasets[0] || {}).data || [];\n",
            "  return points.map(function(p) { return [p.x, p.y, p.r]; });\n",
            "};\n",
            "var applyRows = function(chart, rows) {\n",
            "  var old = chart.data.datasets[0].data || [];\n",
            "  chart.data.datasets[0].data = rows.map(function(r, i) {\n",
            "    var label = old[i] && old[i].label ? old[i].label : 'Point ' + (i + 1);\n",
            "    return { x: Number(r[0]) || 0, y: Number(r[1]) || 0, r: Number(r[2]) || 8, label: label };\n",
            "  });\n",
            "};\n",
            "var payloadFromRows = function(rows) {\n",
            "  return { points: rows.map(function(r) {\n",
            "    return { x: Number(r[0]) || 0, y: Number(r[1]) || 0, r: Number(r[2]) || 8 };\n",
            "  }) };\n",
            "};\n",
            "var applySavedData = function(payload) {\n",
            "  if (!payload || !payload.points) { return; }\n",
            "  var old = config.data.datasets[0].data || [];\n",
            "  config.data.datasets[0].data = payload.points.map(function(p, i) {\n",
            "    var label = p.label || (old[i] && old[i].label) || 'Point ' + (i + 1);\n",
            "    return { x: Number(p.x) || 0, y: Number(p.y) || 0, r: Number(p.r) || 8, label: label };\n",
            "  });\n",
            "};\n",
        ),
    }
}

/// Editor JS placed inside the fragment's IIFE. Defines `loadSavedData`,
/// `applySavedData` and `initEditor`; the mount code calls them. Declares
/// nothing outside the enclosing function scope.
pub fn script(ctx: &EditorContext<'_>, family: EditorFamily) -> String {
    let cid = ctx.chart_id;
    // JSON-encode injected strings so user-controlled ids cannot break out
    // of the JS string context, with `</` escaped against script-tag breakout.
    let presentation_id = super::js_string(ctx.presentation_id);
    let data_base = super::js_string(ctx.data_base_url);
    let family_block = family_js(family);

    format!(
        concat!(
            "var presentationId = {presentation_id};\n",
            "var dataBase = {data_base};\n",
            "{family_block}",
            "var loadSavedData = function(done) {{\n",
            "  try {{\n",
            "    fetch(dataBase + '/api/v1/chart-data/' + encodeURIComponent(presentationId))\n",
            "      .then(function(r) {{ return r.ok ? r.json() : null; }})\n",
            "      .then(function(body) {{\n",
            "        var records = (body && body.records) || [];\n",
            "        for (var i = 0; i < records.length; i++) {{\n",
            "          if (records[i].chart_id === '{cid}') {{ done(records[i].payload); return; }}\n",
            "        }}\n",
            "        done(null);\n",
            "      }})\n",
            "      .catch(function() {{ done(null); }});\n",
            "  }} catch (e) {{ done(null); }}\n",
            "}};\n",
            "var saveChartData = function(payload) {{\n",
            "  try {{\n",
            "    fetch(dataBase + '/api/v1/chart-data', {{\n",
            "      method: 'POST',\n",
            "      headers: {{ 'Content-Type': 'application/json' }},\n",
            "      body: JSON.stringify({{ chart_id: '{cid}', presentation_id: presentationId, payload: payload }})\n",
            "    }}).catch(function() {{}});\n",
            "  }} catch (e) {{}}\n",
            "}};\n",
            "var initEditor = function(chart) {{\n",
            "  var byId = function(suffix) {{ return document.getElementById('{cid}' + suffix); }};\n",
            "  var modal = byId('_modal');\n",
            "  var table = byId('_table');\n",
            "  if (!modal || !table) {{ return; }}\n",
            "  var tbody = table.getElementsByTagName('tbody')[0];\n",
            "  var addRow = function(cells) {{\n",
            "    var tr = document.createElement('tr');\n",
            "    for (var i = 0; i < cells.length; i++) {{\n",
            "      var td = document.createElement('td');\n",
            "      td.style.padding = '4px 10px';\n",
            "      var input = document.createElement('input');\n",
            "      input.type = 'text';\n",
            "      input.value = cells[i] === undefined || cells[i] === null ? '' : String(cells[i]);\n",
            "      input.style.width = '100%';\n",
            "      input.style.boxSizing = 'border-box';\n",
            "      td.appendChild(input);\n",
            "      tr.appendChild(td);\n",
            "    }}\n",
            "    var actions = document.createElement('td');\n",
            "    var remove = document.createElement('button');\n",
            "    remove.type = 'button';\n",
            "    remove.textContent = '\\u00d7';\n",
            "    remove.style.cursor = 'pointer';\n",
            "    remove.onclick = function() {{ tr.parentNode.removeChild(tr); }};\n",
            "    actions.appendChild(remove);\n",
            "    tr.appendChild(actions);\n",
            "    tbody.appendChild(tr);\n",
            "  }};\n",
            "  var openModal = function() {{\n",
            "    tbody.innerHTML = '';\n",
            "    var rows = rowsFromChart(chart);\n",
            "    for (var i = 0; i < rows.length; i++) {{ addRow(rows[i]); }}\n",
            "    modal.style.display = 'block';\n",
            "  }};\n",
            "  var collectRows = function() {{\n",
            "    var rows = [];\n",
            "    var trs = tbody.getElementsByTagName('tr');\n",
            "    for (var i = 0; i < trs.length; i++) {{\n",
            "      var inputs = trs[i].getElementsByTagName('input');\n",
            "      var row = [];\n",
            "      for (var j = 0; j < inputs.length; j++) {{ row.push(inputs[j].value); }}\n",
            "      if (row.length) {{ rows.push(row); }}\n",
            "    }}\n",
            "    return rows;\n",
            "  }};\n",
            "  byId('_edit').onclick = openModal;\n",
            "  byId('_cancel').onclick = function() {{ modal.style.display = 'none'; }};\n",
            "  byId('_addrow').onclick = function() {{ addRow(new Array({columns})); }};\n",
            "  byId('_save').onclick = function() {{\n",
            "    var rows = collectRows();\n",
            "    applyRows(chart, rows);\n",
            "    chart.update();\n",
            "    saveChartData(payloadFromRows(rows));\n",
            "    modal.style.display = 'none';\n",
            "  }};\n",
            "}};\n",
        ),
        presentation_id = presentation_id,
        data_base = data_base,
        family_block = family_block,
        cid = cid,
        columns = headers(family).len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EditorContext<'static> {
        EditorContext {
            chart_id: "chart_abc",
            presentation_id: "pres-1",
            data_base_url: "",
        }
    }

    #[test]
    fn headers_per_family() {
        assert_eq!(headers(EditorFamily::LabelValue), ["Label", "Value"]);
        assert_eq!(headers(EditorFamily::Xy), ["X", "Y"]);
        assert_eq!(headers(EditorFamily::Xyr), ["X", "Y", "Radius"]);
    }

    #[test]
    fn markup_contains_family_headers_and_hidden_modal() {
        let html = markup(&ctx(), EditorFamily::Xyr);
        assert!(html.contains("<th style=\"text-align: left; padding: 6px 10px; border-bottom: 1px solid #e5e7eb;\">Radius</th>"));
        assert!(html.contains("display: none"));
        assert!(html.contains("chart_abc_modal"));
        assert!(html.contains("chart_abc_save"));
    }

    #[test]
    fn script_persists_with_chart_and_presentation_keys() {
        let js = script(&ctx(), EditorFamily::LabelValue);
        assert!(js.contains("chart_id: 'chart_abc'"));
        assert!(js.contains("presentation_id: presentationId"));
        assert!(js.contains("/api/v1/chart-data"));
        assert!(js.contains("chart.update()"));
    }

    #[test]
    fn presentation_id_is_json_escaped() {
        let tricky = EditorContext {
            chart_id: "chart_abc",
            presentation_id: "p'</script>",
            data_base_url: "",
        };
        let js = script(&tricky, EditorFamily::Xy);
        assert!(!js.contains("</script>"));
        assert!(js.contains("<\\/script"));
    }
}
