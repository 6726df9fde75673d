use minijinja::HtmlEscape;
use std::fmt::Write;

use crate::db::QueryResult;

/// Renders a result set as an HTML table with a header row of column names.
/// Cells and headers are escaped; NULL shows as `NULL`.
pub fn render_table(result: &QueryResult) -> String {
    let mut html = String::from("<table>\n<thead>\n<tr>");
    for column in &result.columns {
        let _ = write!(html, "<th>{}</th>", HtmlEscape(column));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in &result.rows {
        html.push_str("<tr>");
        for value in row {
            match value {
                Some(v) => {
                    let _ = write!(html, "<td>{}</td>", HtmlEscape(v));
                }
                None => html.push_str("<td class=\"null\">NULL</td>"),
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_table_layout() {
        let result = QueryResult::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![Some("1".to_string()), Some("a".to_string())],
                vec![Some("2".to_string()), None],
            ],
        );

        assert_eq!(
            render_table(&result),
            "<table>\n<thead>\n<tr><th>id</th><th>name</th></tr>\n</thead>\n<tbody>\n\
             <tr><td>1</td><td>a</td></tr>\n\
             <tr><td>2</td><td class=\"null\">NULL</td></tr>\n\
             </tbody>\n</table>"
        );
    }

    #[test]
    fn test_render_table_escapes_values() {
        let result = QueryResult::new(
            vec!["<b>".to_string()],
            vec![vec![Some("<script>alert('x')</script>".to_string())]],
        );

        let html = render_table(&result);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<th>&lt;b&gt;</th>"));
    }

    #[test]
    fn test_render_empty_result_keeps_header() {
        let result = QueryResult::new(vec!["id".to_string()], vec![]);
        assert_eq!(
            render_table(&result),
            "<table>\n<thead>\n<tr><th>id</th></tr>\n</thead>\n<tbody>\n</tbody>\n</table>"
        );
    }
}
