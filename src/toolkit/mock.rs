
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::toolkit::runner::{ToolError, ToolInvocation, ToolOutput, ToolRunner};
use crate::toolkit::variant_tools::{tabix_index_path, BCFTOOLS, TABIX};

type Hook = Box<dyn Fn(&ToolInvocation)>;

/// Records every invocation and fakes the on-disk effects of bcftools/tabix
#[derive(Default)]
pub struct MockRunner {
    calls: RefCell<Vec<ToolInvocation>>,
    /// program suffix -> exit code
    exit_codes: HashMap<String, i32>,
    header: String,
    sample_names: String,
    /// program suffix -> side effect run on success
    hooks: Vec<(String, Hook)>
}

impl MockRunner {
    /// Every matching program call exits with `code` and has no side effect
    pub fn with_exit_code(mut self, program_suffix: &str, code: i32) -> Self {
        self.exit_codes.insert(program_suffix.to_string(), code);
        self
    }

    /// Text returned by `bcftools view -h`
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = header.to_string();
        self
    }

    /// Text returned by `bcftools query -l`
    pub fn with_sample_names(mut self, names: &str) -> Self {
        self.sample_names = names.to_string();
        self
    }

    /// Registers a side effect for matching program calls
    pub fn with_hook(mut self, program_suffix: &str, hook: impl Fn(&ToolInvocation) + 'static) -> Self {
        self.hooks.push((program_suffix.to_string(), Box::new(hook)));
        self
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.borrow().clone()
    }

    /// Number of recorded calls whose program ends with `program_suffix`
    pub fn count(&self, program_suffix: &str) -> usize {
        self.calls.borrow().iter()
            .filter(|c| c.program.ends_with(program_suffix))
            .count()
    }

    fn fake_effects(&self, invocation: &ToolInvocation) -> ToolOutput {
        if invocation.program == BCFTOOLS {
            if invocation.args.iter().any(|a| a == "-h") {
                return ToolOutput::ok(self.header.clone());
            }
            if invocation.args.first().map(|a| a.as_str()) == Some("query") {
                return ToolOutput::ok(self.sample_names.clone());
            }
            if let Some(out_fn) = invocation.flag_value("-o") {
                let source = invocation.args.last().cloned().unwrap_or_default();
                std::fs::write(out_fn, format!("derived from {source}\n")).unwrap();
            }
        } else if invocation.program == TABIX {
            let data_fn = PathBuf::from(invocation.args.last().unwrap());
            std::fs::write(tabix_index_path(&data_fn), "tbi").unwrap();
        }
        ToolOutput::ok("")
    }
}

impl ToolRunner for MockRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.calls.borrow_mut().push(invocation.clone());

        let failure = self.exit_codes.iter()
            .find(|(suffix, _code)| invocation.program.ends_with(suffix.as_str()));
        if let Some((_suffix, &code)) = failure {
            return Ok(ToolOutput::failed(code, format!("mock failure of {}", invocation.program)));
        }

        let output = self.fake_effects(invocation);
        for (suffix, hook) in self.hooks.iter() {
            if invocation.program.ends_with(suffix.as_str()) {
                hook(invocation);
            }
        }
        Ok(output)
    }
}
