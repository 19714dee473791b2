pub mod shared {
    pub mod config;
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod model_resolver;
    pub mod region;
    pub mod video_metadata;
}

pub mod imaging {
    pub mod bilateral_filter;
    pub mod rotation;
}

pub mod document {
    pub mod domain {
        pub mod field_extractor;
        pub mod orientation_selector;
        pub mod text_recognizer;
        pub mod transcript_scorer;
    }
    pub mod infrastructure {
        pub mod tesseract_recognizer;
    }
}

pub mod detection {
    pub mod domain {
        pub mod face_crop;
        pub mod face_detector;
        pub mod face_locator;
    }
    pub mod infrastructure;
}

pub mod gesture {
    pub mod domain {
        pub mod finger_counter;
        pub mod frame_digit_sample;
        pub mod gesture_video_decoder;
        pub mod hand_tracker;
        pub mod sample_plan;
    }
    pub mod infrastructure {
        pub mod onnx_hand_tracker;
    }
}

pub mod liveness {
    pub mod domain {
        pub mod liveness_matcher;
        pub mod ssim;
    }
}

pub mod otp {
    pub mod domain {
        pub mod expected_pin;
        pub mod sequence_validator;
    }
}

pub mod video {
    pub mod domain {
        pub mod image_writer;
        pub mod video_reader;
    }
    pub mod infrastructure {
        pub mod ffmpeg_reader;
        pub mod image_file_reader;
        pub mod image_file_writer;
    }
}

pub mod pipeline {
    pub mod outcome;
    pub mod pipeline_logger;
    pub mod process_document_use_case;
    pub mod still_image;
    pub mod user_workspace;
    pub mod verification_request;
    pub mod verify_otp_use_case;
    pub mod infrastructure {
        pub mod service_factory;
        pub mod threaded_request_executor;
    }
}
