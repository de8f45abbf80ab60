//! # Output Rendering
//!
//! Writes resolution results in one of six formats.
//!
//! | Format | Output |
//! |--------|--------|
//! | `hosts` | `{{address}} {{host}}` per address (default) |
//! | `csv` | `name,address` header, then `{{host}},{{address}}` per address |
//! | `list` | every distinct address once, sorted, names dropped |
//! | `json` | indented array of `{name, addresses}` objects |
//! | `yaml` | same structure as JSON |
//! | `template` | user template per address, optional header and footer |

mod template;

use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ResolutionResult;

pub use template::{CompiledText, Template, TemplateError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Missing template for output format \"template\"")]
    MissingTemplate,

    #[error("No output attached to printer")]
    MissingSink,

    #[error("Invalid template")]
    Template(#[from] TemplateError),

    #[error("Failed to encode JSON output")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode YAML output")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Output format of a task
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    Csv,
    #[default]
    Hosts,
    List,
    Template,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Csv => "csv",
            OutputFormat::Hosts => "hosts",
            OutputFormat::List => "list",
            OutputFormat::Template => "template",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders results into an attached writer
pub struct Printer<'a> {
    format: OutputFormat,
    template: Option<Template>,
    entries: &'a [ResolutionResult],
    writer: Option<&'a mut dyn Write>,
}

impl<'a> Printer<'a> {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            template: None,
            entries: &[],
            writer: None,
        }
    }

    pub fn with_entries(mut self, entries: &'a [ResolutionResult]) -> Self {
        self.entries = entries;
        self
    }

    /// Sets the user template; only used by the `template` format
    pub fn with_template(mut self, template: Option<Template>) -> Self {
        self.template = template;
        self
    }

    pub fn with_output(mut self, writer: &'a mut dyn Write) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Writes all entries in the configured format
    pub fn print(self) -> Result<(), RenderError> {
        let writer = self.writer.ok_or(RenderError::MissingSink)?;

        match self.format {
            OutputFormat::Hosts => write_template(self.entries, &Template::hosts(), writer),
            OutputFormat::Csv => write_template(self.entries, &Template::csv(), writer),
            OutputFormat::Template => {
                let template = self.template.as_ref().ok_or(RenderError::MissingTemplate)?;
                write_template(self.entries, template, writer)
            }
            OutputFormat::List => write_list(self.entries, writer),
            OutputFormat::Json => write_json(self.entries, writer),
            OutputFormat::Yaml => write_yaml(self.entries, writer),
        }
    }
}

/// Renders `entries` into `writer` in one call
pub fn render(
    entries: &[ResolutionResult],
    format: OutputFormat,
    template: Option<&Template>,
    writer: &mut dyn Write,
) -> Result<(), RenderError> {
    Printer::new(format)
        .with_entries(entries)
        .with_template(template.cloned())
        .with_output(writer)
        .print()
}

fn write_template(
    entries: &[ResolutionResult],
    template: &Template,
    writer: &mut dyn Write,
) -> Result<(), RenderError> {
    if !template.header.is_empty() {
        writeln!(writer, "{}", template.header)?;
    }

    if !template.text.is_empty() {
        let text = template.compile()?;
        for entry in entries {
            for address in &entry.addresses {
                writeln!(writer, "{}", text.expand(entry.name.as_str(), &address.to_string()))?;
            }
        }
    }

    if !template.footer.is_empty() {
        writeln!(writer, "{}", template.footer)?;
    }

    Ok(())
}

fn write_list(entries: &[ResolutionResult], writer: &mut dyn Write) -> Result<(), RenderError> {
    let addresses: BTreeSet<String> = entries
        .iter()
        .flat_map(|entry| entry.addresses.iter().map(|address| address.to_string()))
        .collect();

    for address in addresses {
        writeln!(writer, "{}", address)?;
    }

    Ok(())
}

fn write_json(entries: &[ResolutionResult], writer: &mut dyn Write) -> Result<(), RenderError> {
    serde_json::to_writer_pretty(&mut *writer, entries)?;
    writeln!(writer)?;
    Ok(())
}

fn write_yaml(entries: &[ResolutionResult], writer: &mut dyn Write) -> Result<(), RenderError> {
    serde_yaml::to_writer(writer, entries)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Failure;
    use proptest::prelude::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    fn entries() -> Vec<ResolutionResult> {
        vec![
            ResolutionResult::new(
                "cloudflare.com".parse().unwrap(),
                vec![v4(8, 8, 8, 8), v4(1, 1, 1, 1)],
            ),
            ResolutionResult::new(
                "google.com".parse().unwrap(),
                vec![v4(10, 10, 10, 10), v4(123, 123, 123, 123), v4(8, 8, 8, 8)],
            ),
        ]
    }

    fn rendered(format: OutputFormat, template: Option<&Template>) -> String {
        let mut out = Vec::new();
        render(&entries(), format, template, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn list_format() {
        assert_eq!(
            rendered(OutputFormat::List, None),
            "1.1.1.1\n10.10.10.10\n123.123.123.123\n8.8.8.8\n"
        );
    }

    #[test]
    fn hosts_format() {
        assert_eq!(
            rendered(OutputFormat::Hosts, None),
            "8.8.8.8 cloudflare.com\n\
             1.1.1.1 cloudflare.com\n\
             10.10.10.10 google.com\n\
             123.123.123.123 google.com\n\
             8.8.8.8 google.com\n"
        );
    }

    #[test]
    fn csv_format() {
        assert_eq!(
            rendered(OutputFormat::Csv, None),
            "name,address\n\
             cloudflare.com,8.8.8.8\n\
             cloudflare.com,1.1.1.1\n\
             google.com,10.10.10.10\n\
             google.com,123.123.123.123\n\
             google.com,8.8.8.8\n"
        );
    }

    #[test]
    fn json_format() {
        let expected = r#"[
  {
    "name": "cloudflare.com",
    "addresses": [
      "8.8.8.8",
      "1.1.1.1"
    ]
  },
  {
    "name": "google.com",
    "addresses": [
      "10.10.10.10",
      "123.123.123.123",
      "8.8.8.8"
    ]
  }
]
"#;
        assert_eq!(rendered(OutputFormat::Json, None), expected);
    }

    #[test]
    fn yaml_format() {
        let expected = "\
- name: cloudflare.com
  addresses:
  - 8.8.8.8
  - 1.1.1.1
- name: google.com
  addresses:
  - 10.10.10.10
  - 123.123.123.123
  - 8.8.8.8
";
        assert_eq!(rendered(OutputFormat::Yaml, None), expected);
    }

    #[test]
    fn template_format() {
        let template = Template::new("this is {{host}} with address {{address}}")
            .with_header("hello from the header")
            .with_footer("hello from the footer");

        assert_eq!(
            rendered(OutputFormat::Template, Some(&template)),
            "hello from the header\n\
             this is cloudflare.com with address 8.8.8.8\n\
             this is cloudflare.com with address 1.1.1.1\n\
             this is google.com with address 10.10.10.10\n\
             this is google.com with address 123.123.123.123\n\
             this is google.com with address 8.8.8.8\n\
             hello from the footer\n"
        );
    }

    #[test]
    fn template_with_empty_text_prints_only_header_and_footer() {
        let template = Template::default()
            .with_header("# begin")
            .with_footer("# end");

        assert_eq!(
            rendered(OutputFormat::Template, Some(&template)),
            "# begin\n# end\n"
        );
    }

    #[test]
    fn template_ignored_for_builtin_formats() {
        let template = Template::new("{{host}}").with_header("ignored");
        assert_eq!(
            rendered(OutputFormat::List, Some(&template)),
            rendered(OutputFormat::List, None)
        );
    }

    #[test]
    fn failed_entries_render_without_addresses() {
        let entries = vec![
            ResolutionResult::failed("gone.example".parse().unwrap(), Failure::NotFound),
            ResolutionResult::new("up.example".parse().unwrap(), vec![v4(192, 0, 2, 1)]),
        ];

        let mut out = Vec::new();
        render(&entries, OutputFormat::Hosts, None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "192.0.2.1 up.example\n");

        let mut out = Vec::new();
        render(&entries, OutputFormat::Json, None, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["addresses"], serde_json::json!([]));
    }

    #[test]
    fn json_decodes_back_to_results() {
        let mut entries = entries();
        entries.push(ResolutionResult::new(
            "v6.example".parse().unwrap(),
            vec![IpAddr::V6(Ipv6Addr::new(0x2606, 0x4700, 0, 0, 0, 0, 0, 0x1111))],
        ));
        entries.push(ResolutionResult::failed("slow.example".parse().unwrap(), Failure::Timeout));

        let mut out = Vec::new();
        render(&entries, OutputFormat::Json, None, &mut out).unwrap();
        let decoded: Vec<ResolutionResult> = serde_json::from_slice(&out).unwrap();

        let expected: Vec<ResolutionResult> = entries
            .into_iter()
            .map(|entry| ResolutionResult::new(entry.name, entry.addresses))
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn missing_template() {
        let mut out = Vec::new();
        let err = Printer::new(OutputFormat::Template)
            .with_entries(&[])
            .with_output(&mut out)
            .print()
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingTemplate));
    }

    #[test]
    fn missing_sink() {
        let err = Printer::new(OutputFormat::List).print().unwrap_err();
        assert!(matches!(err, RenderError::MissingSink));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_propagate() {
        let err = render(&entries(), OutputFormat::Hosts, None, &mut BrokenPipe).unwrap_err();
        match err {
            RenderError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn format_names() {
        let format: OutputFormat = serde_yaml::from_str("template").unwrap();
        assert_eq!(format, OutputFormat::Template);
        assert!(serde_yaml::from_str::<OutputFormat>("xml").is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Hosts);
    }

    proptest! {
        #[test]
        fn list_is_sorted_union_independent_of_order(
            groups in prop::collection::vec(prop::collection::vec(any::<[u8; 4]>(), 0..5), 0..6),
            rotate in 0usize..6,
        ) {
            let mut entries: Vec<ResolutionResult> = groups
                .iter()
                .enumerate()
                .map(|(i, group)| {
                    ResolutionResult::new(
                        format!("host{i}.example").parse().unwrap(),
                        group.iter().map(|o| IpAddr::V4(Ipv4Addr::from(*o))).collect(),
                    )
                })
                .collect();

            let mut forward = Vec::new();
            render(&entries, OutputFormat::List, None, &mut forward).unwrap();

            if !entries.is_empty() {
                let by = rotate % entries.len();
                entries.rotate_left(by);
            }
            entries.reverse();
            let mut shuffled = Vec::new();
            render(&entries, OutputFormat::List, None, &mut shuffled).unwrap();

            prop_assert_eq!(&forward, &shuffled);

            let text = String::from_utf8(forward).unwrap();
            let lines: Vec<&str> = text.lines().collect();
            let mut expected: Vec<String> = groups
                .iter()
                .flatten()
                .map(|o| Ipv4Addr::from(*o).to_string())
                .collect();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(lines, expected);
            prop_assert!(!text.contains("\n\n"));
        }

        #[test]
        fn empty_template_text_skips_every_pair(count in 0usize..8) {
            let entries: Vec<ResolutionResult> = (0..count)
                .map(|i| ResolutionResult::new(
                    format!("n{i}.example").parse().unwrap(),
                    vec![v4(192, 0, 2, i as u8)],
                ))
                .collect();
            let template = Template::default().with_header("head").with_footer("foot");

            let mut out = Vec::new();
            render(&entries, OutputFormat::Template, Some(&template), &mut out).unwrap();
            prop_assert_eq!(String::from_utf8(out).unwrap(), "head\nfoot\n");
        }
    }
}
