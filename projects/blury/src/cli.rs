use crate::pipeline::filter::DEFAULT_PASSES;
use crate::pipeline::types::InferencePolicy;
use clap::Parser;
use std::path::PathBuf;

/// Blur persons' faces and vehicle license plates in a directory of images.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory which contains input images (walked recursively)
    #[arg(short = 'i', long, env = "BLURY_DATA_IN")]
    pub data_in_path: Option<String>,

    /// Directory which receives the blurred images
    #[arg(short = 'o', long, env = "BLURY_DATA_OUT")]
    pub data_out_path: Option<String>,

    /// Minimum detection confidence
    #[arg(short = 't', long, default_value_t = 0.1)]
    pub threshold: f32,

    /// Number of blur passes applied to each region
    #[arg(short = 'f', long = "filter", default_value_t = DEFAULT_PASSES)]
    pub filter: u32,

    /// YAML file giving the input and output directories instead of -i/-o
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Object detection model (RT-DETR, ONNX). Checked after the directories.
    #[arg(long, env = "BLURY_MODEL")]
    pub model: Option<String>,

    /// Face detection model (SeetaFace). Checked after the directories.
    #[arg(long, env = "BLURY_FACE_MODEL")]
    pub face_model: Option<String>,

    /// What to do when a model fails on an image
    #[arg(long, value_enum, default_value_t = InferencePolicy::Abort)]
    pub on_inference_error: InferencePolicy,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from([
            "blury",
            "-i",
            "in",
            "-o",
            "out",
            "--model",
            "m.onnx",
            "--face-model",
            "f.bin",
        ])
        .unwrap();
        assert_eq!(args.data_in_path.as_deref(), Some("in"));
        assert_eq!(args.data_out_path.as_deref(), Some("out"));
        assert_eq!(args.threshold, 0.1);
        assert_eq!(args.filter, 3);
        assert!(args.config.is_none());
        assert_eq!(args.model.as_deref(), Some("m.onnx"));
        assert_eq!(args.face_model.as_deref(), Some("f.bin"));
        assert_eq!(args.on_inference_error, InferencePolicy::Abort);
    }

    #[test]
    fn test_models_not_required_to_parse() {
        let args = Args::try_parse_from(["blury", "-c", "missing.yml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("missing.yml")));
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "blury",
            "-c",
            "dirs.yml",
            "-t",
            "0.25",
            "-f",
            "5",
            "--model",
            "m.onnx",
            "--face-model",
            "f.bin",
            "--on-inference-error",
            "skip",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("dirs.yml")));
        assert_eq!(args.threshold, 0.25);
        assert_eq!(args.filter, 5);
        assert_eq!(args.on_inference_error, InferencePolicy::Skip);
    }
}
