#[cfg(test)]
mod formatting_tests {
    use crate::extract::{ErrorRecord, WarningRecord};
    use crate::parser::{try_parse, Document, Element, Node, ParseOptions};
    use crate::renderer::{OutputFormat, PanelRenderer, Render, RenderContext};

    fn parse(text: &str) -> Document {
        try_parse(text, &ParseOptions::default()).unwrap()
    }

    fn render(format: OutputFormat, text: &str) -> String {
        PanelRenderer::new(format).render_xml(&parse(text))
    }

    #[test]
    fn test_html_nested_element_with_attribute() {
        let output = render(OutputFormat::Html, r#"<root attr="x"><child/></root>"#);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "&lt;<span class='tag_name'>root</span> <span class='attr_name'>attr</span>=<span class='attr_value'>&quot;x&quot;</span>&gt;"
        );
        assert_eq!(lines[1], "&nbsp;&nbsp;&lt;<span class='tag_name'>child</span>/&gt;");
        assert_eq!(lines[2], "&lt;/<span class='tag_name'>root</span>&gt;");
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_html_comment_and_text() {
        let output = render(OutputFormat::Html, "<a><!-- note --><b>x &lt; y</b></a>");
        let lines: Vec<&str> = output.lines().collect();

        // Comment payload keeps its own spaces inside the added delimiters
        assert_eq!(
            lines[1],
            "&nbsp;&nbsp;<span class='comment'>&lt;!--  note  --&gt;</span>"
        );
        assert_eq!(
            lines[3],
            "&nbsp;&nbsp;&nbsp;&nbsp;<span class='text_node'>x &lt; y</span>"
        );
    }

    #[test]
    fn test_html_attribute_value_is_escaped() {
        let output = render(OutputFormat::Html, r#"<a href="x/y?a=1&amp;b='2'"/>"#);
        assert_eq!(
            output,
            "&lt;<span class='tag_name'>a</span> <span class='attr_name'>href</span>=<span class='attr_value'>&quot;x&#x2F;y?a=1&amp;b=&#39;2&#39;&quot;</span>/&gt;\n"
        );
    }

    #[test]
    fn test_plain_indentation_and_attribute_order() {
        let output = render(
            OutputFormat::Plain,
            r#"<a z="1" b="2"><b><c k="v">text</c></b></a>"#,
        );
        assert_eq!(
            output,
            "<a z=\"1\" b=\"2\">\n  <b>\n    <c k=\"v\">\n      text\n    </c>\n  </b>\n</a>\n"
        );
    }

    #[test]
    fn test_whitespace_only_text_is_skipped() {
        let output = render(OutputFormat::Plain, "<a>\n   \n\t<b/>\n</a>");
        assert_eq!(output, "<a>\n  <b/>\n</a>\n");
    }

    #[test]
    fn test_element_with_only_whitespace_keeps_open_and_close() {
        let output = render(OutputFormat::Plain, "<a> </a>");
        assert_eq!(output, "<a>\n</a>\n");
    }

    #[test]
    fn test_text_keeps_surrounding_whitespace() {
        let output = render(OutputFormat::Plain, "<a>  padded </a>");
        assert_eq!(output, "<a>\n    padded \n</a>\n");
    }

    #[test]
    fn test_top_level_comment_is_rendered() {
        let output = render(OutputFormat::Plain, "<!--head--><a/>");
        assert_eq!(output, "<!-- head -->\n<a/>\n");
    }

    #[test]
    fn test_ansi_keeps_raw_text() {
        let output = render(OutputFormat::Ansi, r#"<a k="v&amp;w">x</a>"#);
        assert!(output.contains("v&w"));
        assert!(!output.contains("&amp;"));
        assert!(!output.contains("&nbsp;"));
    }

    #[test]
    fn test_node_render_with_depth() {
        let node = Node::Element(Element::new("leaf").with_attribute("id", "7"));
        let context = RenderContext::new(OutputFormat::Plain).with_depth(2);
        assert_eq!(node.render(&context), "    <leaf id=\"7\"/>\n");
    }

    #[test]
    fn test_parser_error_marker_renders_as_element() {
        let doc = Document::parser_error("broken");
        let output = PanelRenderer::new(OutputFormat::Plain).render_xml(&doc);
        assert_eq!(output, "<parsererror>\n  broken\n</parsererror>\n");
    }

    #[test]
    fn test_html_record_lists() {
        let renderer = PanelRenderer::new(OutputFormat::Html);
        let errors = vec![ErrorRecord {
            code: "2".to_string(),
            text: "b <bad>".to_string(),
        }];
        assert_eq!(
            renderer.render_errors(&errors),
            "<ol><li><b>Code 2: </b>b &lt;bad&gt;</li></ol>"
        );
        assert_eq!(renderer.render_warnings(&[]), "<ol></ol>");
    }

    #[test]
    fn test_plain_record_lists() {
        let renderer = PanelRenderer::new(OutputFormat::Plain);
        let warnings = vec![
            WarningRecord {
                text: "slow".to_string(),
            },
            WarningRecord {
                text: "late".to_string(),
            },
        ];
        assert_eq!(renderer.render_warnings(&warnings), "1. slow\n2. late\n");
        assert_eq!(renderer.render_errors(&[]), "");
    }
}

#[cfg(test)]
mod pipeline_tests {
    use crate::parser::ParseOptions;
    use crate::pipeline::{DocumentPipeline, PanelKind, Status};
    use crate::renderer::OutputFormat;

    fn pipeline(format: OutputFormat) -> DocumentPipeline {
        DocumentPipeline::new(format, ParseOptions::default())
    }

    #[test]
    fn test_warning_is_listed_and_stripped() {
        let state = pipeline(OutputFormat::Html)
            .run(r#"<data><warning text="slow"/><value>42</value></data>"#);

        assert_eq!(state.status, Status::Ok);
        assert_eq!(state.panels.warnings, "<ol><li>slow</li></ol>");
        assert_eq!(state.panels.errors, "<ol></ol>");
        assert_eq!(state.tab_caption(PanelKind::Warnings), "Warnings (1)");
        assert_eq!(state.tab_caption(PanelKind::Errors), "Errors (0)");

        let lines: Vec<&str> = state.panels.xml.lines().collect();
        assert_eq!(lines[0], "&lt;<span class='tag_name'>data</span>&gt;");
        assert!(lines.iter().any(|line| line.contains("<span class='text_node'>42</span>")));
        assert_eq!(lines[lines.len() - 1], "&lt;/<span class='tag_name'>data</span>&gt;");
        assert!(!state.panels.xml.contains("warning"));
    }

    #[test]
    fn test_errors_panel_in_reverse_order() {
        let state = pipeline(OutputFormat::Html)
            .run(r#"<r><error code="1" text="a"/><error code="2" text="b"/></r>"#);
        assert_eq!(
            state.panels.errors,
            "<ol><li><b>Code 2: </b>b</li><li><b>Code 1: </b>a</li></ol>"
        );
    }

    #[test]
    fn test_same_input_same_output() {
        let text = r#"<r><!--c--><error code="1" text="a"/><warning text="w"/><v k="1">x</v></r>"#;
        let pipeline = pipeline(OutputFormat::Html);
        assert_eq!(pipeline.run(text), pipeline.run(text));
    }

    #[test]
    fn test_malformed_attribute_is_incorrect_data() {
        let state = pipeline(OutputFormat::Html).run(r#"<a b="<"/>"#);
        assert_eq!(state.status, Status::IncorrectData);
        assert!(state.panels.xml.is_empty());
        assert_eq!(state.tab_caption(PanelKind::Xml), "XML (0 bytes)");
    }

    #[test]
    fn test_empty_body_is_incorrect_data() {
        let state = pipeline(OutputFormat::Html).run("");
        assert_eq!(state.status, Status::IncorrectData);
        assert!(state.panels.xml.is_empty());
        assert!(state.panels.errors.is_empty());
        assert!(state.panels.warnings.is_empty());
        assert_eq!(state.tab_caption(PanelKind::Xml), "XML (0 bytes)");
    }
}
