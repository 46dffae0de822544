//! Natural-language instructions for each generation call.

use crate::form::model::TagLabel;
use crate::form::LessonPlanForm;

pub const CURRICULUM_YEAR: &str = "2025";

pub fn topics(subject: &str, grade: &str, search: Option<&str>) -> String {
    let focus = match search.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => format!(
            "\n    Kata kunci pencarian: {query}\n    Utamakan bab dan materi yang relevan dengan kata kunci tersebut."
        ),
        None => String::new(),
    };

    format!(
        r#"Sebagai pakar Kurikulum Merdeka Indonesia, berikan daftar bab dan topik materi pelajaran yang PALING AKURAT dan SESUAI dengan buku teks utama Kemendikbudristek untuk SEMESTER 2 (GENAP) TAHUN {CURRICULUM_YEAR}:
    Mata Pelajaran: {subject}
    Jenjang: SD
    Kelas: {grade}{focus}

    Ketentuan:
    1. Materi harus spesifik untuk Semester 2 (Bab-bab akhir buku).
    2. Contoh: Jika Matematika Kelas 4, fokus pada Luas & Volume, Bangun Datar, atau Penyajian Data.
    3. Jika IPAS Kelas 5, fokus pada Ekosistem, Magnet, Listrik, atau Warisan Budaya.
    4. Setiap bab berisi label bab (chapter), judul bab (title), dan daftar judul materi (materials) yang profesional.
    5. Berikan paling banyak 10 bab, urut sesuai buku."#
    )
}

pub fn objectives(subject: &str, material: &str, grade: &str) -> String {
    let dimensions = label_list::<crate::form::GraduateDimension>();
    let pedagogy = label_list::<crate::form::PedagogicalPractice>();

    format!(
        r#"Sebagai pakar Kurikulum Merdeka Indonesia versi {CURRICULUM_YEAR}, buatkan detail berikut:
    Mata Pelajaran: {subject}
    Materi: {material}
    Kelas: {grade} SD (Semester 2)

    1. Capaian Pembelajaran (CP) sesuai regulasi Kemendikbudristek No. 12 Tahun 2024 yang relevan dengan topik ini.
    2. Minimal 3 Tujuan Pembelajaran (TP) yang logis dan operasional.
    3. Daftar Dimensi Profil Lulusan (Pilih: {dimensions}).
    4. Saran jumlah pertemuan ideal untuk menuntaskan materi ini.
    5. Saran Praktik Pedagogis utama (Pilih: {pedagogy}).

    Output dalam format JSON."#
    )
}

pub fn lesson_content(form: &LessonPlanForm) -> String {
    let pedagogy = form
        .pedagogy
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(", ");
    let dimensions = form
        .dimensions
        .iter()
        .map(|d| d.label())
        .collect::<Vec<_>>()
        .join(", ");
    let count = form.meeting_count;

    format!(
        r#"Buatkan konten otomatis untuk Rencana Pembelajaran Mendalam (RPM) SD Semester 2 Kurikulum Merdeka {CURRICULUM_YEAR}:
    - Mata Pelajaran: {subject}
    - Kelas: {grade}
    - Materi Pokok: {material}
    - CP: {cp}
    - TP: {tp}
    - Praktik Pedagogis: {pedagogy}
    - Dimensi Lulusan: {dimensions}
    - Jumlah Pertemuan: {count}
    - Alokasi Waktu per Pertemuan: {duration}

    Instruksi Khusus untuk {count} Pertemuan:
    Setiap pertemuan HARUS berbeda aktivitasnya namun berkesinambungan.
    Misal Pertemuan 1 fokus Membangun Pemahaman, Pertemuan 2 fokus Aplikasi/Proyek, Pertemuan 3 fokus Evaluasi/Refleksi.
    Setiap kegiatan (pendahuluan, memahami, mengaplikasi, merefleksi, penutup) wajib mencantumkan durasi dalam menit.

    Persyaratan Output JSON:
    1. students: Profil singkat siswa SD kelas tersebut.
    2. interdisciplinary: Kaitan materi ini dengan mata pelajaran lain.
    3. partnership: Melibatkan orang tua/komunitas.
    4. environment: Penataan kelas/lingkungan yang mendukung.
    5. digitalTools: Aplikasi/media digital yang relevan.
    6. summary: Ringkasan materi yang padat dan jelas.
    7. meetings: Array berisi tepat {count} objek meeting (opening, understand, apply, reflect, closing).
    8. assessments: Detail asesmen awal, proses, dan akhir (technique, instrument, rubric).
    9. lkpd: Lembar kerja siswa yang kreatif.
    10. formativeQuestions: 10 soal pilihan ganda berkualitas tinggi dengan opsi a, b, c, d dan kunci jawaban berupa huruf a/b/c/d."#,
        subject = form.subject,
        grade = form.grade,
        material = form.material,
        cp = form.cp,
        tp = form.tp,
        duration = form.duration,
    )
}

pub fn illustration(topic: &str) -> String {
    format!(
        "Visual media for elementary students about \"{topic}\". Clear, vibrant educational illustration. Clean style, no text."
    )
}

pub fn annual_program(subject: &str, grade: &str) -> String {
    format!(
        r#"Sebagai pakar Kurikulum Merdeka Indonesia, susun Program Tahunan (PROTA) tahun pelajaran {CURRICULUM_YEAR} untuk:
    Mata Pelajaran: {subject}
    Jenjang: SD
    Kelas: {grade}

    Ketentuan:
    1. Cantumkan seluruh lingkup materi semester 1 dan semester 2 sesuai urutan buku teks Kemendikbudristek.
    2. semester bernilai 1 (ganjil) atau 2 (genap).
    3. hours adalah alokasi Jam Pelajaran (JP) berupa bilangan bulat yang realistis.
    4. Output berupa JSON array."#
    )
}

pub fn semester_program(subject: &str, grade: &str, semester: u8, month_codes: &[&str]) -> String {
    let months = month_codes.join(", ");
    format!(
        r#"Sebagai pakar Kurikulum Merdeka Indonesia, susun Program Semester (PROMES) semester {semester} tahun pelajaran {CURRICULUM_YEAR} untuk:
    Mata Pelajaran: {subject}
    Jenjang: SD
    Kelas: {grade}

    Ketentuan:
    1. Setiap baris berisi tujuan pembelajaran / lingkup materi (material), alokasi JP (hours, bilangan bulat), dan minggu pelaksanaan (weeks).
    2. weeks berisi kode dengan format "Bulan-Minggu", contoh "Feb-3". Bulan yang tersedia: {months}. Minggu bernilai 1 sampai 4.
    3. Jadwal materi berurutan dan tidak saling tumpang tindih.
    4. Output berupa JSON array."#
    )
}

fn label_list<T: TagLabel>() -> String {
    T::ALL.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ")
}
