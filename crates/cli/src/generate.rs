use clap::Args;
use std::path::PathBuf;

use protowrap_core::{
    API_DIR_ENV, DEFAULT_API_DIR, DEFAULT_WRAP_DIR, GenerateOptions, PROTOC_ENV, ProtocValidator,
    SchemaValidator, SkipValidation, WRAP_DIR_ENV, WRAPPER_ENV, WrapperKind, generate_api,
};
use tracing::{debug, error};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Directory containing wrap.yml
    #[arg(long = "wrap-dir", env = WRAP_DIR_ENV, default_value = DEFAULT_WRAP_DIR)]
    pub wrap_dir: PathBuf,

    /// Directory receiving main.proto and meta.yml
    #[arg(long = "api-dir", env = API_DIR_ENV, default_value = DEFAULT_API_DIR)]
    pub api_dir: PathBuf,

    /// Wrapper adapter ("python-wrapper" adds interpreter settings to Config)
    #[arg(long, env = WRAPPER_ENV)]
    pub wrapper: Option<String>,

    /// Path to the protoc binary used to validate the generated schema
    #[arg(long, env = PROTOC_ENV, value_name = "PATH")]
    pub protoc: Option<PathBuf>,

    /// Write the artifacts without running protoc (wins over --protoc/PROTOC)
    #[arg(long)]
    pub skip_validation: bool,
}

impl GenerateArgs {
    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            wrap_dir: self.wrap_dir.clone(),
            api_dir: self.api_dir.clone(),
            wrapper: WrapperKind::from_selector(self.wrapper.as_deref()),
        }
    }

    fn validator(&self) -> protowrap_core::Result<Box<dyn SchemaValidator>> {
        if self.skip_validation {
            return Ok(Box::new(SkipValidation));
        }
        let validator = match &self.protoc {
            Some(path) => ProtocValidator::new(path.clone()),
            None => ProtocValidator::discover()?,
        };
        debug!(protoc = %validator.protoc().display(), "Using protoc for validation.");
        Ok(Box::new(validator))
    }
}

pub fn run(args: &GenerateArgs) -> i32 {
    let result = args
        .validator()
        .and_then(|validator| generate_api(&args.options(), validator.as_ref()));

    match result {
        Ok(written) => {
            println!("{}", written.proto.display());
            println!("{}", written.metadata.display());
            0
        }
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            1
        }
    }
}
