use super::error::TtsServiceError;
use super::RemoteAudioRef;
use crate::infrastructure::repositories::TtsRepository;
use anyhow::{anyhow, Context};
use futures::future::try_join_all;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Downloads per-chunk audio segments and splices them into one WAV file.
///
/// Transient files live in a request-scoped directory keyed by a UUID, so
/// concurrent requests never collide in the download namespace. The directory
/// is removed unconditionally once assembly succeeds or fails.
pub struct AudioAssembler {
    tts_repo: Arc<dyn TtsRepository>,
    download_dir: PathBuf,
}

impl AudioAssembler {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, download_dir: PathBuf) -> Self {
        Self {
            tts_repo,
            download_dir,
        }
    }

    /// Download every referenced segment, concatenate them in index order and
    /// publish the result at `output_path`. No partial output is ever
    /// exposed: the file is staged first and renamed into place.
    pub async fn assemble(
        &self,
        refs: &[RemoteAudioRef],
        output_path: &Path,
    ) -> Result<(), TtsServiceError> {
        let request_id = Uuid::new_v4();
        let request_dir = self.download_dir.join(request_id.to_string());
        tokio::fs::create_dir_all(&request_dir)
            .await
            .with_context(|| format!("creating download dir {}", request_dir.display()))?;

        let result = self
            .download_and_splice(&request_dir, refs, output_path)
            .await;

        // Cleanup is unconditional; an already-absent file is a no-op.
        if let Err(e) = tokio::fs::remove_dir_all(&request_dir).await {
            tracing::warn!(
                error = %e,
                dir = %request_dir.display(),
                "Failed to remove transient download directory"
            );
        }

        result
    }

    async fn download_and_splice(
        &self,
        request_dir: &Path,
        refs: &[RemoteAudioRef],
        output_path: &Path,
    ) -> Result<(), TtsServiceError> {
        let local_paths = self.download_segments(request_dir, refs).await?;

        // Stage inside the request directory, then rename onto the fixed
        // output path so readers of that path never see a torn file.
        let staged = request_dir.join("assembled.wav");
        concatenate_wav(&local_paths, &staged)?;

        tokio::fs::rename(&staged, output_path)
            .await
            .with_context(|| format!("publishing output to {}", output_path.display()))?;

        tracing::info!(
            segment_count = local_paths.len(),
            output_path = %output_path.display(),
            "Output file assembled"
        );

        Ok(())
    }

    /// Fetch all segments concurrently. Filenames are index-derived, so the
    /// completion order of downloads cannot change the splice order.
    async fn download_segments(
        &self,
        request_dir: &Path,
        refs: &[RemoteAudioRef],
    ) -> Result<Vec<PathBuf>, TtsServiceError> {
        let downloads = refs.iter().enumerate().map(|(idx, remote_ref)| {
            let path = request_dir.join(format!("{idx}_downloaded.wav"));
            async move {
                let bytes = self.tts_repo.fetch_audio(remote_ref.as_str()).await?;
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("writing segment {}", path.display()))?;
                Ok::<PathBuf, TtsServiceError>(path)
            }
        });

        try_join_all(downloads).await
    }
}

/// Concatenate WAV files in the given order into a single linear-PCM stream.
///
/// Fails with `MissingSegment` if any input file is absent, and with a fatal
/// error if the segments disagree on their sample format.
pub(crate) fn concatenate_wav(
    paths: &[PathBuf],
    output_path: &Path,
) -> Result<(), TtsServiceError> {
    let mut writer: Option<WavWriter<std::io::BufWriter<std::fs::File>>> = None;

    for path in paths {
        if !path.exists() {
            return Err(TtsServiceError::MissingSegment(path.clone()));
        }

        let mut reader = WavReader::open(path)
            .map_err(|e| anyhow!("opening segment {}: {e}", path.display()))?;
        let spec = reader.spec();

        let writer = match writer.as_mut() {
            Some(w) => {
                if w.spec() != spec {
                    return Err(TtsServiceError::Other(anyhow!(
                        "segment {} sample format differs from previous segments",
                        path.display()
                    )));
                }
                w
            }
            None => writer.insert(
                WavWriter::create(output_path, spec)
                    .map_err(|e| anyhow!("creating output {}: {e}", output_path.display()))?,
            ),
        };

        match spec.sample_format {
            SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    let sample =
                        sample.map_err(|e| anyhow!("reading {}: {e}", path.display()))?;
                    writer
                        .write_sample(sample)
                        .map_err(|e| anyhow!("writing sample: {e}"))?;
                }
            }
            SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    let sample =
                        sample.map_err(|e| anyhow!("reading {}: {e}", path.display()))?;
                    writer
                        .write_sample(sample)
                        .map_err(|e| anyhow!("writing sample: {e}"))?;
                }
            }
        }
    }

    match writer {
        Some(w) => {
            w.finalize().map_err(|e| anyhow!("finalizing output: {e}"))?;
            Ok(())
        }
        None => Err(TtsServiceError::Invalid(
            "no segments to concatenate".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tts::BackendResponse;
    use crate::infrastructure::repositories::{TtsBackendError, TtsRepository};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn wav_bytes(samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn write_wav(path: &Path, samples: &[i16]) {
        std::fs::write(path, wav_bytes(samples)).unwrap();
    }

    fn read_samples(path: &Path) -> Vec<i16> {
        let mut reader = hound::WavReader::open(path).unwrap();
        reader.samples::<i16>().map(|s| s.unwrap()).collect()
    }

    /// Serves one canned WAV per ref; fails transport for refs marked "bad".
    struct CannedFileBackend;

    #[async_trait]
    impl TtsRepository for CannedFileBackend {
        async fn submit_chunk(
            &self,
            _text: &str,
            _language: &str,
        ) -> Result<BackendResponse, TtsBackendError> {
            unreachable!("assembler never submits text")
        }

        async fn fetch_audio(&self, remote_ref: &str) -> Result<Vec<u8>, TtsBackendError> {
            if remote_ref == "bad" {
                return Err(TtsBackendError::Protocol("download failed".to_string()));
            }
            let marker: i16 = remote_ref.parse().unwrap();
            Ok(wav_bytes(&[marker, marker]))
        }
    }

    fn refs(names: &[&str]) -> Vec<RemoteAudioRef> {
        names.iter().map(|n| RemoteAudioRef(n.to_string())).collect()
    }

    #[tokio::test]
    async fn assembles_segments_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let assembler =
            AudioAssembler::new(Arc::new(CannedFileBackend), dir.path().join("downloads"));
        let output = dir.path().join("output.wav");

        assembler
            .assemble(&refs(&["1", "2", "3"]), &output)
            .await
            .unwrap();

        assert_eq!(read_samples(&output), vec![1, 1, 2, 2, 3, 3]);
    }

    #[tokio::test]
    async fn no_transient_files_remain_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("downloads");
        let assembler = AudioAssembler::new(Arc::new(CannedFileBackend), downloads.clone());
        let output = dir.path().join("output.wav");

        assembler.assemble(&refs(&["7"]), &output).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(&downloads).unwrap().collect();
        assert!(leftovers.is_empty(), "transient files left: {leftovers:?}");
    }

    #[tokio::test]
    async fn failed_download_cleans_up_and_produces_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("downloads");
        let assembler = AudioAssembler::new(Arc::new(CannedFileBackend), downloads.clone());
        let output = dir.path().join("output.wav");

        let err = assembler
            .assemble(&refs(&["1", "2", "bad"]), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, TtsServiceError::ProtocolViolation(_)));
        assert!(!output.exists(), "partial output must never be exposed");
        let leftovers: Vec<_> = std::fs::read_dir(&downloads).unwrap().collect();
        assert!(leftovers.is_empty(), "transient files left: {leftovers:?}");
    }

    #[tokio::test]
    async fn output_is_overwritten_on_each_request() {
        let dir = tempfile::tempdir().unwrap();
        let assembler =
            AudioAssembler::new(Arc::new(CannedFileBackend), dir.path().join("downloads"));
        let output = dir.path().join("output.wav");

        assembler.assemble(&refs(&["1"]), &output).await.unwrap();
        assembler.assemble(&refs(&["2"]), &output).await.unwrap();

        assert_eq!(read_samples(&output), vec![2, 2]);
    }

    #[test]
    fn concatenate_fails_with_missing_segment() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("0_downloaded.wav");
        write_wav(&present, &[1]);
        let absent = dir.path().join("1_downloaded.wav");
        let output = dir.path().join("out.wav");

        let err = concatenate_wav(&[present, absent.clone()], &output).unwrap_err();
        match err {
            TtsServiceError::MissingSegment(path) => assert_eq!(path, absent),
            other => panic!("expected MissingSegment, got {other:?}"),
        }
    }

    #[test]
    fn concatenate_fails_on_sample_format_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("0_downloaded.wav");
        write_wav(&first, &[1]);

        let second = dir.path().join("1_downloaded.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&second, spec).unwrap();
        writer.write_sample(1i16).unwrap();
        writer.write_sample(1i16).unwrap();
        writer.finalize().unwrap();

        let output = dir.path().join("out.wav");
        let err = concatenate_wav(&[first, second], &output).unwrap_err();
        assert!(matches!(err, TtsServiceError::Other(_)));
    }

    #[test]
    fn concatenate_with_no_segments_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.wav");
        let err = concatenate_wav(&[], &output).unwrap_err();
        assert!(matches!(err, TtsServiceError::Invalid(_)));
    }
}
