//! Display Builder screen generation.
//!
//! One screen file per parameter group. Writable groups render an editable
//! row per parameter (label, value editor, saved-value readback) with a
//! highlight rule that colors the editor while the live value differs from
//! the last saved one. Read-only groups render plain readback tables.

use std::fmt::Write;

use epicsgen_dsl::param::Param;

/// Vertical pitch of one parameter row, in pixels.
const ROW_PITCH: usize = 24;

/// One generated screen: a target file name and its XML content.
pub struct Screen {
    pub file_name: String,
    pub xml: String,
}

/// Generates one screen per parameter group found in the unit. The file
/// name is `<stem>_<group>.bob`; groups appear in declaration order.
pub fn generate_screens(params: &[Param], source_stem: &str) -> Vec<Screen> {
    let mut groups: Vec<(&'static str, Vec<&Param>)> = Vec::new();
    for param in params {
        let group = param.kind.group();
        match groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, members)) => members.push(param),
            None => groups.push((group, vec![param])),
        }
    }

    groups
        .into_iter()
        .map(|(group, members)| {
            let title = format!("$(D) {}", group);
            let writable = members.iter().all(|p| p.kind.is_writable());
            let xml = if writable {
                editable_screen(&title, &members)
            } else {
                readback_screen(&title, &members)
            };
            log::debug!("Generated {} screen with {} row(s)", group, members.len());
            Screen {
                file_name: format!("{}_{}.bob", source_stem, group),
                xml,
            }
        })
        .collect()
}

fn editable_screen(title: &str, params: &[&Param]) -> String {
    let mut xml = header(title);

    for (row, param) in params.iter().enumerate() {
        let y = row * ROW_PITCH;
        row_frame(&mut xml, y, 440);
        row_label(&mut xml, y, param);

        // Enumerated parameters get a dropdown, numeric ones a text entry.
        let widget = if param.options.is_empty() {
            "textentry"
        } else {
            "combo"
        };
        let _ = write!(
            xml,
            "  <widget type=\"{widget}\" version=\"2.0.0\">\n\
            \x20   <pv_name>$(P){name}</pv_name>\n\
            \x20   <x>150</x>\n\
            \x20   <y>{y}</y>\n\
            \x20   <width>130</width>\n\
            \x20   <height>20</height>\n\
            \x20   <background_color>\n\
            \x20     <color name=\"Read_Background\" red=\"240\" green=\"240\" blue=\"240\">\n\
            \x20     </color>\n\
            \x20   </background_color>\n\
            \x20   <rules>\n\
            \x20     <rule name=\"Color\" prop_id=\"background_color\" out_exp=\"false\">\n\
            \x20       <exp bool_exp=\"pv0!=pv1\">\n\
            \x20         <value>\n\
            \x20           <color red=\"255\" green=\"220\" blue=\"20\">\n\
            \x20           </color>\n\
            \x20         </value>\n\
            \x20       </exp>\n\
            \x20       <pv_name>$(P){name}</pv_name>\n\
            \x20       <pv_name>$(P){name}_Saved</pv_name>\n\
            \x20     </rule>\n\
            \x20   </rules>\n\
            \x20 </widget>\n",
            widget = widget,
            name = param.name,
            y = y + 2,
        );

        let _ = write!(
            xml,
            "  <widget type=\"textupdate\" version=\"2.0.0\">\n\
            \x20   <pv_name>$(P){name}_Saved</pv_name>\n\
            \x20   <x>305</x>\n\
            \x20   <y>{y}</y>\n\
            \x20   <width>130</width>\n\
            \x20   <height>20</height>\n\
            \x20 </widget>\n",
            name = param.name,
            y = y + 2,
        );
    }

    footer(xml, params.len())
}

fn readback_screen(title: &str, params: &[&Param]) -> String {
    let mut xml = header(title);

    for (row, param) in params.iter().enumerate() {
        let y = row * ROW_PITCH;
        row_frame(&mut xml, y, 282);
        row_label(&mut xml, y, param);

        let _ = write!(
            xml,
            "  <widget type=\"textupdate\" version=\"2.0.0\">\n\
            \x20   <pv_name>$(P){name}</pv_name>\n\
            \x20   <x>150</x>\n\
            \x20   <y>{y}</y>\n\
            \x20   <width>130</width>\n\
            \x20   <height>20</height>\n\
            \x20 </widget>\n",
            name = param.name,
            y = y + 2,
        );
    }

    footer(xml, params.len())
}

fn header(title: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <display version=\"2.0.0\">\n\
        \x20 <name>{}</name>\n\
        \x20 <width>650</width>\n",
        xml_escape(title)
    )
}

fn footer(mut xml: String, rows: usize) -> String {
    let _ = write!(xml, "  <height>{}</height>\n</display>\n", rows * ROW_PITCH + 6);
    xml
}

fn row_frame(xml: &mut String, y: usize, width: usize) {
    let _ = write!(
        xml,
        "  <widget type=\"rectangle\" version=\"2.0.0\">\n\
        \x20   <name>Rectangle</name>\n\
        \x20   <x>1</x>\n\
        \x20   <y>{y}</y>\n\
        \x20   <width>{width}</width>\n\
        \x20   <height>25</height>\n\
        \x20   <line_width>1</line_width>\n\
        \x20   <line_color>\n\
        \x20     <color name=\"Grid\" red=\"128\" green=\"128\" blue=\"128\"></color>\n\
        \x20   </line_color>\n\
        \x20   <background_color>\n\
        \x20     <color name=\"Background\" red=\"255\" green=\"255\" blue=\"255\"></color>\n\
        \x20   </background_color>\n\
        \x20 </widget>\n",
        y = y,
        width = width,
    );
}

fn row_label(xml: &mut String, y: usize, param: &Param) {
    let _ = write!(
        xml,
        "  <widget type=\"label\" version=\"2.0.0\">\n\
        \x20   <x>5</x>\n\
        \x20   <y>{y}</y>\n\
        \x20   <width>145</width>\n\
        \x20   <height>20</height>\n\
        \x20   <text>{name}</text>\n\
        \x20   <tooltip>{tooltip}</tooltip>\n\
        \x20   <horizontal_alignment>0</horizontal_alignment>\n\
        \x20 </widget>\n",
        y = y + 2,
        name = xml_escape(&param.name),
        tooltip = xml_escape(&param.description),
    );
}

/// Escapes the five XML-significant characters in text content.
pub(crate) fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '>' => escaped.push_str("&gt;"),
            '<' => escaped.push_str("&lt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
