use serde::Serialize;

pub(crate) fn export_to_json_impl<T: Serialize>(
    items: &[T],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, items)?;
    std::io::Write::flush(&mut writer)?;
    Ok(())
}
