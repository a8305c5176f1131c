//! The four fixed calendar tool definitions registered on a client's agent.

use serde_json::{json, Value};

/// The calendar operations the voice agent can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarTool {
    /// Read availability for a date range.
    ConsultarAgenda,
    /// Create an appointment.
    AgendarCita,
    /// Move an existing appointment.
    ReagendarCita,
    /// Cancel an appointment.
    CancelarCita,
}

impl CalendarTool {
    /// All four tools, in registration order.
    pub const ALL: [CalendarTool; 4] = [
        CalendarTool::ConsultarAgenda,
        CalendarTool::AgendarCita,
        CalendarTool::ReagendarCita,
        CalendarTool::CancelarCita,
    ];

    /// The tool name seen by the LLM.
    pub fn name(self) -> &'static str {
        match self {
            CalendarTool::ConsultarAgenda => "consultar_agenda",
            CalendarTool::AgendarCita => "agendar_cita",
            CalendarTool::ReagendarCita => "reagendar_cita",
            CalendarTool::CancelarCita => "cancelar_cita",
        }
    }

    /// The webhook endpoint segment the tool calls.
    pub fn endpoint(self) -> &'static str {
        match self {
            CalendarTool::ConsultarAgenda => "list-events",
            CalendarTool::AgendarCita => "create-event",
            CalendarTool::ReagendarCita => "update-event",
            CalendarTool::CancelarCita => "delete-event",
        }
    }

    /// HTTP method for the webhook call.
    pub fn method(self) -> &'static str {
        match self {
            CalendarTool::ConsultarAgenda => "GET",
            _ => "POST",
        }
    }

    /// Parse a tool name back into a known kind. Foreign tool names map to
    /// `None` and are never touched by reconciliation.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            CalendarTool::ConsultarAgenda => {
                "Consulta la agenda y devuelve las citas existentes en un rango de fechas. \
                 Úsala cuando la persona pregunte por disponibilidad u horarios libres. \
                 Si solo menciona un día, omite date_to para consultar únicamente ese día."
            }
            CalendarTool::AgendarCita => {
                "Crea una cita nueva en la agenda. Úsala solo después de confirmar con la \
                 persona el motivo, la fecha y las horas de inicio y fin."
            }
            CalendarTool::ReagendarCita => {
                "Mueve una cita existente a una nueva fecha y hora. Úsala cuando la persona \
                 quiera cambiar una cita ya agendada; identifícala por el nombre con el que \
                 se agendó y, si hay ambigüedad, por su fecha original."
            }
            CalendarTool::CancelarCita => {
                "Cancela una cita existente. Úsala cuando la persona quiera cancelar; \
                 confirma antes el nombre con el que se agendó y la fecha de la cita."
            }
        }
    }

    fn parameters(self) -> Value {
        match self {
            CalendarTool::ConsultarAgenda => json!({
                "type": "object",
                "properties": {
                    "date_from": {
                        "type": "string",
                        "description": "Primera fecha a consultar, en formato ISO (YYYY-MM-DD)."
                    },
                    "date_to": {
                        "type": "string",
                        "description": "Última fecha a consultar (YYYY-MM-DD). Si se omite, se consulta solo date_from."
                    }
                },
                "required": ["date_from"]
            }),
            CalendarTool::AgendarCita => json!({
                "type": "object",
                "properties": {
                    "summary": {
                        "type": "string",
                        "description": "Motivo de la cita, por ejemplo 'Corte de cabello'."
                    },
                    "date": {
                        "type": "string",
                        "description": "Fecha de la cita (YYYY-MM-DD)."
                    },
                    "start_time": {
                        "type": "string",
                        "description": "Hora de inicio en formato 24 horas (HH:MM)."
                    },
                    "end_time": {
                        "type": "string",
                        "description": "Hora de fin en formato 24 horas (HH:MM)."
                    },
                    "description": {
                        "type": "string",
                        "description": "Notas adicionales sobre la cita."
                    },
                    "attendee_name": {
                        "type": "string",
                        "description": "Nombre de la persona que agenda la cita."
                    },
                    "attendee_phone": {
                        "type": "string",
                        "description": "Teléfono de contacto de la persona."
                    }
                },
                "required": ["summary", "date", "start_time", "end_time"]
            }),
            CalendarTool::ReagendarCita => json!({
                "type": "object",
                "properties": {
                    "attendee_name": {
                        "type": "string",
                        "description": "Nombre con el que se agendó la cita original."
                    },
                    "new_date": {
                        "type": "string",
                        "description": "Nueva fecha de la cita (YYYY-MM-DD)."
                    },
                    "new_start_time": {
                        "type": "string",
                        "description": "Nueva hora de inicio en formato 24 horas (HH:MM)."
                    },
                    "new_end_time": {
                        "type": "string",
                        "description": "Nueva hora de fin en formato 24 horas (HH:MM)."
                    },
                    "original_date": {
                        "type": "string",
                        "description": "Fecha original de la cita (YYYY-MM-DD), para distinguirla si hay varias con el mismo nombre."
                    }
                },
                "required": ["attendee_name", "new_date", "new_start_time", "new_end_time"]
            }),
            CalendarTool::CancelarCita => json!({
                "type": "object",
                "properties": {
                    "attendee_name": {
                        "type": "string",
                        "description": "Nombre con el que se agendó la cita."
                    },
                    "date": {
                        "type": "string",
                        "description": "Fecha de la cita a cancelar (YYYY-MM-DD)."
                    }
                },
                "required": ["attendee_name", "date"]
            }),
        }
    }

    /// Full tool definition pointing at this service's webhook endpoint.
    pub fn definition(self, base_url: &str, webhook_token: &str) -> Value {
        let base = base_url.trim_end_matches('/');
        json!({
            "type": "custom",
            "name": self.name(),
            "description": self.description(),
            "url": format!(
                "{base}/api/calendar/tools/{}?token={webhook_token}",
                self.endpoint()
            ),
            "method": self.method(),
            "speak_during_execution": true,
            "speak_after_execution": true,
            "parameters": self.parameters(),
        })
    }
}

/// Build all four tool definitions for a client.
pub fn build_tool_definitions(base_url: &str, webhook_token: &str) -> Vec<Value> {
    CalendarTool::ALL
        .into_iter()
        .map(|t| t.definition(base_url, webhook_token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trip() {
        for tool in CalendarTool::ALL {
            assert_eq!(CalendarTool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(CalendarTool::from_name("other_tool"), None);
    }

    #[test]
    fn test_definition_url_embeds_token() {
        let def = CalendarTool::ConsultarAgenda.definition("https://app.example.com/", "tok_123");
        assert_eq!(
            def["url"],
            "https://app.example.com/api/calendar/tools/list-events?token=tok_123"
        );
        assert_eq!(def["method"], "GET");
        assert_eq!(def["parameters"]["required"], serde_json::json!(["date_from"]));
    }

    #[test]
    fn test_methods_match_contract() {
        assert_eq!(CalendarTool::ConsultarAgenda.method(), "GET");
        assert_eq!(CalendarTool::AgendarCita.method(), "POST");
        assert_eq!(CalendarTool::ReagendarCita.method(), "POST");
        assert_eq!(CalendarTool::CancelarCita.method(), "POST");
    }
}
